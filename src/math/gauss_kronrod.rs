//! Globally adaptive integration with the 7-point Gauss / 15-point Kronrod
//! rule pair.
//!
//! Unbounded domains are mapped onto `(0, 1]` with `x = a + (1 - t)/t`. The
//! Kronrod abscissae never touch the interval end points, so the singular end
//! of the mapping is never evaluated.

use super::{
    fin, IntegrationDomain, IntegrationError, IntegrationResult, Integrator, Quadrature,
    QuadratureConfig,
};
use std::{cmp::Ordering, collections::BinaryHeap};

/// Non-negative Kronrod abscissae, in decreasing order. Odd entries are the
/// Gauss abscissae.
const KRONROD_COORDS: [fin; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const KRONROD_WEIGHTS: [fin; 8] = [
    0.022_935_322_010_529_224,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

const GAUSS_WEIGHTS: [fin; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Adaptive Gauss-Kronrod integrator that keeps bisecting the subinterval with
/// the largest error estimate until the total error is within tolerance.
#[derive(Clone, Debug)]
pub struct GaussKronrodIntegrator {
    config: QuadratureConfig,
}

#[derive(Clone, Copy, Debug)]
struct Segment {
    start: fin,
    end: fin,
    value: fin,
    error: fin,
}

/// Orders segments by their error estimate so that the max-heap pops the worst one.
struct WorstSegment(Segment);

impl PartialEq for WorstSegment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WorstSegment {}

impl PartialOrd for WorstSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.error.total_cmp(&other.0.error)
    }
}

impl GaussKronrodIntegrator {
    pub fn new(config: QuadratureConfig) -> Self {
        Self { config }
    }

    fn tolerance(&self, value: fin) -> fin {
        fin::max(
            self.config.absolute_tolerance,
            self.config.relative_tolerance * value.abs(),
        )
    }

    fn integrate_unit_interval<E>(&self, evaluate_integrand: &E) -> IntegrationResult<Quadrature>
    where
        E: Fn(fin) -> IntegrationResult<fin>,
    {
        self.integrate_interval(evaluate_integrand, 0.0, 1.0)
    }

    fn integrate_interval<E>(
        &self,
        evaluate_integrand: &E,
        start: fin,
        end: fin,
    ) -> IntegrationResult<Quadrature>
    where
        E: Fn(fin) -> IntegrationResult<fin>,
    {
        if !(end >= start) {
            return Err(IntegrationError::InvalidDomain { start, end });
        }
        if end == start {
            return Ok(Quadrature {
                value: 0.0,
                estimated_error: 0.0,
                intervals: 1,
            });
        }

        let first = evaluate_segment(evaluate_integrand, start, end)?;
        let mut value = first.value;
        let mut error = first.error;
        let mut segments = BinaryHeap::with_capacity(self.config.max_intervals);
        segments.push(WorstSegment(first));

        while error > self.tolerance(value) {
            if segments.len() >= self.config.max_intervals {
                return self.not_converged(&segments);
            }
            let worst = match segments.pop() {
                Some(WorstSegment(segment)) => segment,
                None => break,
            };
            let midpoint = 0.5 * (worst.start + worst.end);
            if midpoint <= worst.start || midpoint >= worst.end {
                // Interval can no longer be bisected in floating point.
                segments.push(WorstSegment(worst));
                return self.not_converged(&segments);
            }
            let left = evaluate_segment(evaluate_integrand, worst.start, midpoint)?;
            let right = evaluate_segment(evaluate_integrand, midpoint, worst.end)?;

            value += left.value + right.value - worst.value;
            error += left.error + right.error - worst.error;

            segments.push(WorstSegment(left));
            segments.push(WorstSegment(right));
        }

        // Resum to get rid of accumulated round-off from the incremental updates.
        let (value, estimated_error) = segments
            .iter()
            .fold((0.0, 0.0), |(value, error), WorstSegment(segment)| {
                (value + segment.value, error + segment.error)
            });
        Ok(Quadrature {
            value,
            estimated_error,
            intervals: segments.len(),
        })
    }

    fn not_converged(
        &self,
        segments: &BinaryHeap<WorstSegment>,
    ) -> IntegrationResult<Quadrature> {
        let (value, estimated_error) = segments
            .iter()
            .fold((0.0, 0.0), |(value, error), WorstSegment(segment)| {
                (value + segment.value, error + segment.error)
            });
        log::warn!(
            "Adaptive quadrature did not converge: value {:e}, error {:e} after {} subintervals",
            value,
            estimated_error,
            segments.len()
        );
        Err(IntegrationError::NotConverged {
            intervals: segments.len(),
            value,
            estimated_error,
            tolerance: self.tolerance(value),
        })
    }
}

impl Default for GaussKronrodIntegrator {
    fn default() -> Self {
        Self::new(QuadratureConfig::default())
    }
}

impl Integrator for GaussKronrodIntegrator {
    fn integrate(
        &self,
        integrand: &dyn Fn(fin) -> IntegrationResult<fin>,
        domain: IntegrationDomain,
    ) -> IntegrationResult<Quadrature> {
        match domain {
            IntegrationDomain::Finite { start, end } => {
                self.integrate_interval(&integrand, start, end)
            }
            IntegrationDomain::SemiInfinite { start } => {
                let transformed = |t: fin| {
                    let inv_t = 1.0 / t;
                    Ok(integrand(start + (1.0 - t) * inv_t)? * inv_t * inv_t)
                };
                self.integrate_unit_interval(&transformed)
            }
            IntegrationDomain::Infinite => {
                let transformed = |t: fin| {
                    let inv_t = 1.0 / t;
                    let x = (1.0 - t) * inv_t;
                    Ok((integrand(x)? + integrand(-x)?) * inv_t * inv_t)
                };
                self.integrate_unit_interval(&transformed)
            }
        }
    }
}

/// Applies the 15-point Kronrod rule to the interval and estimates its error
/// from the difference to the embedded 7-point Gauss rule.
fn evaluate_segment<E>(evaluate_integrand: &E, start: fin, end: fin) -> IntegrationResult<Segment>
where
    E: Fn(fin) -> IntegrationResult<fin>,
{
    let interval_scale = 0.5 * (end - start);
    let interval_offset = 0.5 * (end + start);

    let evaluate = |x: fin| -> IntegrationResult<fin> {
        let value = evaluate_integrand(x)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(IntegrationError::NonFiniteIntegrand { x })
        }
    };

    let center_value = evaluate(interval_offset)?;
    let mut kronrod_sum = KRONROD_WEIGHTS[7] * center_value;
    let mut gauss_sum = GAUSS_WEIGHTS[3] * center_value;

    for (idx, (&coord, &kronrod_weight)) in KRONROD_COORDS[..7]
        .iter()
        .zip(KRONROD_WEIGHTS[..7].iter())
        .enumerate()
    {
        let displacement = interval_scale * coord;
        let pair_sum =
            evaluate(interval_offset - displacement)? + evaluate(interval_offset + displacement)?;
        kronrod_sum += kronrod_weight * pair_sum;
        if idx % 2 == 1 {
            gauss_sum += GAUSS_WEIGHTS[idx / 2] * pair_sum;
        }
    }

    Ok(Segment {
        start,
        end,
        value: kronrod_sum * interval_scale,
        error: ((kronrod_sum - gauss_sum) * interval_scale).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn integrator(relative_tolerance: fin, max_intervals: usize) -> GaussKronrodIntegrator {
        GaussKronrodIntegrator::new(QuadratureConfig {
            absolute_tolerance: 0.0,
            relative_tolerance,
            max_intervals,
        })
    }

    #[test]
    fn polynomials_are_integrated_exactly() {
        let result = integrator(1e-12, 10)
            .integrate(
                &|x| Ok(x.powi(12) - 3.0 * x.powi(5) + 1.0),
                IntegrationDomain::Finite {
                    start: -1.0,
                    end: 2.0,
                },
            )
            .unwrap();
        let exact = (2.0_f64.powi(13) + 1.0) / 13.0 - 0.5 * (64.0 - 1.0) + 3.0;
        assert_relative_eq!(result.value, exact, max_relative = 1e-13);
    }

    #[test]
    fn semi_infinite_exponential_works() {
        let result = integrator(1e-10, 100)
            .integrate(
                &|x| Ok(fin::exp(-2.0 * x)),
                IntegrationDomain::SemiInfinite { start: 1.0 },
            )
            .unwrap();
        assert_relative_eq!(result.value, 0.5 * fin::exp(-2.0), max_relative = 1e-9);
    }

    #[test]
    fn infinite_gaussian_works() {
        let result = integrator(1e-10, 100)
            .integrate(&|x| Ok(fin::exp(-x * x)), IntegrationDomain::Infinite)
            .unwrap();
        assert_relative_eq!(
            result.value,
            std::f64::consts::PI.sqrt(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn integrable_singularity_converges_with_enough_intervals() {
        let result = integrator(1e-8, 200)
            .integrate(
                &|x| Ok(1.0 / fin::sqrt(x)),
                IntegrationDomain::Finite {
                    start: 0.0,
                    end: 1.0,
                },
            )
            .unwrap();
        assert_relative_eq!(result.value, 2.0, max_relative = 1e-7);
    }

    #[test]
    fn exceeding_interval_limit_is_reported() {
        let result = integrator(1e-14, 3).integrate(
            &|x| Ok(fin::sin(50.0 * x) / fin::sqrt(x)),
            IntegrationDomain::Finite {
                start: 0.0,
                end: 1.0,
            },
        );
        match result {
            Err(IntegrationError::NotConverged { intervals, .. }) => assert_eq!(intervals, 3),
            other => panic!("Expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_integrand_is_reported() {
        let result = integrator(1e-8, 100).integrate(
            &|x| Ok(1.0 / (x - 0.5)),
            IntegrationDomain::Finite {
                start: 0.0,
                end: 1.0,
            },
        );
        assert!(matches!(
            result,
            Err(IntegrationError::NonFiniteIntegrand { .. })
        ));
    }

    #[test]
    fn reversed_interval_is_rejected() {
        let result = integrator(1e-8, 100).integrate(
            &|_| Ok(1.0),
            IntegrationDomain::Finite {
                start: 1.0,
                end: 0.0,
            },
        );
        assert!(matches!(result, Err(IntegrationError::InvalidDomain { .. })));
    }

    #[test]
    fn integrand_errors_propagate() {
        let result = integrator(1e-8, 100).integrate(
            &|x| Err(IntegrationError::NonFiniteIntegrand { x }),
            IntegrationDomain::Infinite,
        );
        assert!(matches!(
            result,
            Err(IntegrationError::NonFiniteIntegrand { .. })
        ));
    }
}
