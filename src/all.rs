// NOTE This kind of import-all file isn't a common Rust idiom.

pub use crate::{
  calibration::*,
  corners::*,
  font::*,
  header::*,
  input::*,
  layer::*,
  math::*,
  output::*,
  parameters::*,
  projector::*,
  speed::*,
  track::*,
  types::*,
  util::*,
  visualize::*,
};

// Reached as `geodesy::` to keep its short function names qualified.
pub(crate) use crate::geodesy;

pub use {
  std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
  },
  log::{debug, info, warn, LevelFilter},
  anyhow::{anyhow, bail, Context as AnyhowContext, Result},
  serde::Deserialize,
  chrono::{DateTime, TimeZone, Utc},
  chrono_tz::Tz,
};
