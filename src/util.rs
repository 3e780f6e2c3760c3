// Colored `file:line message` lines for env_logger. Written to stderr so
// that stdout only carries the rendered image.
pub fn format_log(
  buf: &mut env_logger::fmt::Formatter,
  record: &log::Record,
) -> std::io::Result<()> {
  use std::io::Write;
  let mut style = buf.style();
  use env_logger::fmt::Color::*;
  use log::Level::*;
  style.set_color(match record.level() {
    Error => Red,
    Warn => Yellow,
    Info => Green,
    Debug => Magenta,
    Trace => Blue,
  });

  let s = format!("{:5} {:24}{}",
    record.level(),
    format!("{}:{}",
      record.file().unwrap_or("?").trim_start_matches("src/"),
      record.line().unwrap_or(0),
    ),
    record.args()
  );
  writeln!(buf, "{}", style.value(s))
}

// `"1"`/`"0"` switch of the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switch(pub bool);

impl std::str::FromStr for Switch {
  type Err = String;

  fn from_str(s: &str) -> Result<Switch, String> {
    match s {
      "1" => Ok(Switch(true)),
      "0" => Ok(Switch(false)),
      _ => Err(format!("expected \"1\" or \"0\", got \"{}\"", s)),
    }
  }
}

pub fn parse_timezone(s: &str) -> Result<chrono_tz::Tz, String> {
  s.parse::<chrono_tz::Tz>().map_err(|err| format!("unknown timezone {}: {}", s, err))
}
