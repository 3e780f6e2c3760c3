use crate::all::*;

// Adjugate of a 3x3 matrix. Equals the inverse scaled by the determinant,
// which is enough for homogeneous transforms since the scale cancels out.
pub fn adjugate(m: &Matrix3d) -> Matrix3d {
  Matrix3d::new(
    m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)],
    m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)],
    m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)],
    m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)],
    m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)],
    m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)],
    m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)],
    m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)],
    m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
  )
}

// Matrix taking the projective basis (1,0,0), (0,1,0), (0,0,1), (1,1,1)
// to the four given points.
pub fn basis_to_points(p: &[Vector2d; 4]) -> Matrix3d {
  let m = Matrix3d::new(
    p[0][0], p[1][0], p[2][0],
    p[0][1], p[1][1], p[2][1],
    1., 1., 1.,
  );
  let w = adjugate(&m) * Vector3d::new(p[3][0], p[3][1], 1.);
  m * Matrix3d::from_diagonal(&w)
}

// Homography taking each of `from` to the corresponding point of `to`.
pub fn general_2d_projection(from: &[Vector2d; 4], to: &[Vector2d; 4]) -> Matrix3d {
  basis_to_points(to) * adjugate(&basis_to_points(from))
}

pub fn project(m: &Matrix3d, p: &Vector2d) -> Vector2d {
  let h = m * Vector3d::new(p[0], p[1], 1.);
  Vector2d::new(h[0] / h[2], h[1] / h[2])
}

// Twice the signed area of the triangle, relative to its longest side squared.
// Near zero when the points are (close to) collinear.
pub fn triangle_flatness(a: &Vector2d, b: &Vector2d, c: &Vector2d) -> f64 {
  let ab = b - a;
  let ac = c - a;
  let longest = ab.norm_squared().max(ac.norm_squared()).max((c - b).norm_squared());
  if longest == 0. { return 0. }
  (ab[0] * ac[1] - ab[1] * ac[0]).abs() / longest
}
