use nalgebra::{Matrix3, Point2};
use serde::{Deserialize, Serialize};

/// A 2-D similarity transform (uniform scale + rotation + translation).
///
/// Maps `(x, y)` to `(a*x - b*y + tx, b*x + a*y + ty)`, i.e. the linear part
/// is `s * R(theta)` with `a = s*cos(theta)` and `b = s*sin(theta)`. Four
/// degrees of freedom, stored as a 2x3 affine with the constrained form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub a: f64,
    pub b: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Similarity {
    pub fn new(a: f64, b: f64, tx: f64, ty: f64) -> Self {
        Self { a, b, tx, ty }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    pub fn from_scale_rotation_translation(scale: f64, angle: f64, tx: f64, ty: f64) -> Self {
        Self::new(scale * angle.cos(), scale * angle.sin(), tx, ty)
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let x = p.x as f64;
        let y = p.y as f64;
        Point2::new(
            (self.a * x - self.b * y + self.tx) as f32,
            (self.b * x + self.a * y + self.ty) as f32,
        )
    }

    /// Uniform scale factor, `sqrt(a^2 + b^2)`.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Rotation angle in radians.
    #[inline]
    pub fn rotation(&self) -> f64 {
        self.b.atan2(self.a)
    }

    #[inline]
    pub fn translation(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    /// Inverse transform, `None` for a collapsed (zero-scale) transform.
    pub fn inverse(&self) -> Option<Self> {
        let d = self.a * self.a + self.b * self.b;
        if !d.is_finite() || d < f64::EPSILON {
            return None;
        }
        let ia = self.a / d;
        let ib = -self.b / d;
        Some(Self::new(
            ia,
            ib,
            -(ia * self.tx - ib * self.ty),
            -(ib * self.tx + ia * self.ty),
        ))
    }

    /// Promote to a 3x3 matrix for uniform handling alongside homographies.
    pub fn to_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.a, -self.b, self.tx, //
            self.b, self.a, self.ty, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Closed-form least-squares similarity fit mapping `src[i]` onto `dst[i]`.
///
/// Standard 2-D Procrustes with scale: centre both point sets, solve for the
/// constrained linear part `[a -b; b a]` minimising the summed squared
/// residual, then recover the translation from the centroids. Exact for two
/// distinct points. Returns `None` when fewer than two pairs are given or the
/// source points are (near-)coincident.
pub fn fit_similarity_least_squares(pairs: &[(Point2<f32>, Point2<f32>)]) -> Option<Similarity> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mut pcx = 0.0;
    let mut pcy = 0.0;
    let mut qcx = 0.0;
    let mut qcy = 0.0;
    for (p, q) in pairs {
        pcx += p.x as f64;
        pcy += p.y as f64;
        qcx += q.x as f64;
        qcy += q.y as f64;
    }
    pcx /= n;
    pcy /= n;
    qcx /= n;
    qcy /= n;

    let mut spp = 0.0;
    let mut sa = 0.0;
    let mut sb = 0.0;
    for (p, q) in pairs {
        let px = p.x as f64 - pcx;
        let py = p.y as f64 - pcy;
        let qx = q.x as f64 - qcx;
        let qy = q.y as f64 - qcy;
        spp += px * px + py * py;
        sa += px * qx + py * qy;
        sb += px * qy - py * qx;
    }

    if spp < 1e-9 {
        return None;
    }

    let a = sa / spp;
    let b = sb / spp;
    let tx = qcx - (a * pcx - b * pcy);
    let ty = qcy - (b * pcx + a * pcy);
    Some(Similarity::new(a, b, tx, ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.4},{:.4}) ~ ({:.4},{:.4}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn identity_is_a_noop() {
        let t = Similarity::identity();
        let p = Point2::new(12.5_f32, -3.0);
        assert_eq!(t.apply(p), p);
        assert_relative_eq!(t.scale(), 1.0);
        assert_relative_eq!(t.rotation(), 0.0);
    }

    #[test]
    fn inverse_round_trips_points() {
        let t = Similarity::from_scale_rotation_translation(1.3, 0.4, 17.0, -6.0);
        let inv = t.inverse().expect("invertible");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(50.0_f32, -20.0),
            Point2::new(320.0_f32, 200.0),
        ] {
            assert_close(inv.apply(t.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn zero_scale_has_no_inverse() {
        assert!(Similarity::new(0.0, 0.0, 5.0, 5.0).inverse().is_none());
    }

    #[test]
    fn two_point_fit_is_exact() {
        let truth = Similarity::from_scale_rotation_translation(0.9, -0.25, 8.0, 3.5);
        let src = [Point2::new(10.0_f32, 20.0), Point2::new(90.0_f32, 40.0)];
        let pairs: Vec<_> = src.iter().map(|&p| (p, truth.apply(p))).collect();

        let fit = fit_similarity_least_squares(&pairs).expect("fit");
        assert_relative_eq!(fit.a, truth.a, epsilon = 1e-4);
        assert_relative_eq!(fit.b, truth.b, epsilon = 1e-4);
        assert_relative_eq!(fit.tx, truth.tx, epsilon = 1e-3);
        assert_relative_eq!(fit.ty, truth.ty, epsilon = 1e-3);
    }

    #[test]
    fn overdetermined_fit_recovers_the_transform() {
        let truth = Similarity::from_scale_rotation_translation(1.1, 0.15, -12.0, 30.0);
        let pairs: Vec<_> = (0..5)
            .flat_map(|gy| (0..5).map(move |gx| Point2::new(gx as f32 * 25.0, gy as f32 * 18.0)))
            .map(|p| (p, truth.apply(p)))
            .collect();

        let fit = fit_similarity_least_squares(&pairs).expect("fit");
        for (p, q) in &pairs {
            assert_close(fit.apply(*p), *q, 1e-2);
        }
    }

    #[test]
    fn coincident_points_are_rejected() {
        let p = Point2::new(5.0_f32, 5.0);
        assert!(fit_similarity_least_squares(&[(p, p), (p, p)]).is_none());
        assert!(fit_similarity_least_squares(&[(p, p)]).is_none());
    }
}
