use camcal_core::Real;
use serde::{Deserialize, Serialize};

/// Robust loss kernels for iteratively re-weighted least squares (IRLS).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RobustKernel {
    /// No robustness, pure L2 (quadratic).
    #[default]
    None,
    /// Huber loss with a given threshold.
    Huber { delta: Real },
    /// Cauchy loss with a scale parameter.
    Cauchy { c: Real },
}

impl RobustKernel {
    /// Return the robust loss `rho(r^2)` and the IRLS weight `w(r)` for a
    /// squared residual.
    ///
    /// Intended for the classic IRLS procedure: evaluate residuals, compute
    /// weights, then scale residual and Jacobian rows by `sqrt(w_i)` before
    /// solving the linearized system.
    pub fn rho_and_weight(self, r2: Real) -> (Real, Real) {
        match self {
            RobustKernel::None => (r2, 1.0),
            RobustKernel::Huber { delta } => {
                let r = r2.sqrt();
                if r <= delta {
                    (r2, 1.0)
                } else {
                    (2.0 * delta * r - delta * delta, delta / r)
                }
            }
            RobustKernel::Cauchy { c } => {
                let t = r2 / (c * c);
                (c * c * (1.0 + t).ln(), 1.0 / (1.0 + t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Real, b: Real, tol: Real) {
        assert!(
            (a - b).abs() <= tol,
            "values differ: {} vs {} (tol={})",
            a,
            b,
            tol
        );
    }

    #[test]
    fn huber_matches_l2_for_small_residuals() {
        let kernel = RobustKernel::Huber { delta: 1.0 };
        let r2 = 0.25;
        let (rho, w) = kernel.rho_and_weight(r2);
        approx_eq(rho, r2, 1e-9);
        approx_eq(w, 1.0, 1e-9);
    }

    #[test]
    fn huber_linear_for_large_residuals() {
        let kernel = RobustKernel::Huber { delta: 1.0 };
        let r = 5.0;
        let (rho, w) = kernel.rho_and_weight(r * r);
        approx_eq(rho, 2.0 * r - 1.0, 1e-9);
        approx_eq(w, 1.0 / r, 1e-9);
    }

    #[test]
    fn cauchy_weight_decreases_with_r() {
        let kernel = RobustKernel::Cauchy { c: 1.0 };
        let (_, w_small) = kernel.rho_and_weight(0.01);
        let (_, w_large) = kernel.rho_and_weight(100.0);
        assert!(w_small > 0.9);
        assert!(w_large < 0.02);
        assert!(w_small > w_large);
    }

    #[test]
    fn kernel_serde_roundtrip() {
        let kernel = RobustKernel::Huber { delta: 2.5 };
        let json = serde_json::to_string(&kernel).unwrap();
        assert!(json.contains("huber"));
        let de: RobustKernel = serde_json::from_str(&json).unwrap();
        match de {
            RobustKernel::Huber { delta } => approx_eq(delta, 2.5, 1e-12),
            other => panic!("unexpected kernel: {other:?}"),
        }
    }
}
