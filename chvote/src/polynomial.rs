use crate::*;
use num_traits::Zero;
use std::collections::HashSet;

/// A point on a polynomial over the prime field
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    #[serde(with = "BigUintHex")]
    pub x: BigUint,
    #[serde(with = "BigUintHex")]
    pub y: BigUint,
}

impl Point {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Point { x, y }
    }

    pub fn to_hash_value(&self) -> HashValue {
        HashValue::integers(&[self.x.clone(), self.y.clone()])
    }
}

/// The points of all elections (flattened, election by election) and every polynomial's value at zero
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PointsAndZeroImages {
    pub points: Vec<Point>,
    #[serde(with = "biguint_vec_hex")]
    pub y0s: Vec<BigUint>,
}

/// Generate one random polynomial per election and evaluate it at distinct random non-zero points.
///
/// Election `j` gets a polynomial of degree `k[j] - 1` evaluated at `n[j]` points.
/// If `k[j]` is zero the polynomial is the zero polynomial.
pub fn gen_points(
    n: &[usize],
    k: &[usize],
    field: &PrimeField,
    rng: &mut RandomGenerator,
) -> PointsAndZeroImages {
    debug_assert_eq!(n.len(), k.len());

    let mut points = Vec::with_capacity(n.iter().sum());
    let mut y0s = Vec::with_capacity(n.len());

    for (n_j, k_j) in n.iter().zip(k.iter()) {
        let coefficients = gen_polynomial(*k_j as isize - 1, field, rng);
        let mut seen = HashSet::with_capacity(*n_j);

        while seen.len() < *n_j {
            let x = rng.random_nonzero_in_zq(&field.p_prime);
            if seen.insert(x.clone()) {
                let y = get_y_value(&x, &coefficients, field);
                points.push(Point::new(x, y));
            }
        }
        y0s.push(get_y_value(&BigUint::zero(), &coefficients, field));
    }

    PointsAndZeroImages { points, y0s }
}

/// Coefficients `a_0..a_d` of a random polynomial of exact degree `d`.
///
/// A negative degree yields the zero polynomial `[0]`.
pub fn gen_polynomial(d: isize, field: &PrimeField, rng: &mut RandomGenerator) -> Vec<BigUint> {
    if d < 0 {
        return vec![BigUint::zero()];
    }
    let d = d as usize;
    let mut coefficients: Vec<BigUint> = (0..d)
        .map(|_| rng.random_in_zq(&field.p_prime))
        .collect();
    coefficients.push(rng.random_nonzero_in_zq(&field.p_prime));
    coefficients
}

/// Evaluate the polynomial at `x` (Horner's method)
pub fn get_y_value(x: &BigUint, coefficients: &[BigUint], field: &PrimeField) -> BigUint {
    let p = &field.p_prime;
    coefficients
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, a| acc.mod_mul(x, p).mod_add(a, p))
}

/// Lagrange interpolation of the polynomial through `points` at `x = 0`.
///
/// Returns `None` if two points share an x coordinate. No points interpolate to zero.
pub fn get_value(points: &[Point], field: &PrimeField) -> Option<BigUint> {
    let p = &field.p_prime;
    let mut y = BigUint::zero();

    for (i, point_i) in points.iter().enumerate() {
        let mut numerator = BigUint::from(1u32);
        let mut denominator = BigUint::from(1u32);
        for (k, point_k) in points.iter().enumerate() {
            if k != i {
                numerator = numerator.mod_mul(&point_k.x, p);
                denominator = denominator.mod_mul(&point_k.x.mod_sub(&point_i.x, p), p);
            }
        }
        let factor = numerator.mod_mul(&denominator.mod_inverse(p)?, p);
        y = y.mod_add(&point_i.y.mod_mul(&factor, p), p);
    }

    Some(y)
}
