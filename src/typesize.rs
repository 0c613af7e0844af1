//! Supported-Types & Type-Size Algebra (spec.md §4.1).

use crate::hypothesis::ModellingHypothesis;

/// The closed classification of value shapes a variable's declared type
/// maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedTypeCategory {
    Scalar,
    TVector,
    STensor,
    Tensor,
}

/// Recognises the fixed vocabulary of declared types (spec.md §6, "numeric
/// kernel... fixed vocabulary").
pub fn classify(type_name: &str) -> Option<SupportedTypeCategory> {
    use SupportedTypeCategory::*;
    match type_name {
        "real" | "stress" | "strain" | "frequency" | "temperature" | "time" => Some(Scalar),
        "TVector" => Some(TVector),
        "Stensor" | "StrainStensor" | "StressStensor" => Some(STensor),
        "Tensor" | "DeformationGradientTensor" => Some(Tensor),
        _ => None,
    }
}

/// A symbolic four-tuple `(n_scalar, n_tvector, n_stensor, n_tensor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeSize {
    pub scalars: i64,
    pub tvectors: i64,
    pub stensors: i64,
    pub tensors: i64,
}

impl TypeSize {
    pub const ZERO: TypeSize = TypeSize { scalars: 0, tvectors: 0, stensors: 0, tensors: 0 };

    pub fn of_category(category: SupportedTypeCategory) -> TypeSize {
        match category {
            SupportedTypeCategory::Scalar => TypeSize { scalars: 1, ..TypeSize::ZERO },
            SupportedTypeCategory::TVector => TypeSize { tvectors: 1, ..TypeSize::ZERO },
            SupportedTypeCategory::STensor => TypeSize { stensors: 1, ..TypeSize::ZERO },
            SupportedTypeCategory::Tensor => TypeSize { tensors: 1, ..TypeSize::ZERO },
        }
    }

    /// `TypeSize` of a declared `(type, array_size)` pair.
    pub fn of_variable(category: SupportedTypeCategory, array_size: u32) -> TypeSize {
        Self::of_category(category) * (array_size as i64)
    }

    pub fn is_null(&self) -> bool {
        *self == TypeSize::ZERO
    }

    /// `TypeSize` of the derivative type `v1 x v2`, used to size a Jacobian
    /// block view (spec.md §4.1, "size of a derivative type").
    pub fn derivative_of(v1: TypeSize, v2: TypeSize) -> TypeSize {
        // A derivative's shape is the outer product of its operands along
        // each axis; for the scalar-dominated algebra used by block views we
        // track only the row/column-count product per matching category.
        TypeSize {
            scalars: v1.scalars * v2.scalars,
            tvectors: v1.scalars * v2.tvectors + v1.tvectors * v2.scalars,
            stensors: v1.scalars * v2.stensors + v1.stensors * v2.scalars,
            tensors: v1.scalars * v2.tensors + v1.tensors * v2.scalars + v1.stensors * v2.stensors,
        }
    }

    /// Stringifies the size as an algebraic expression using the
    /// hypothesis-dependent dimension placeholders `TVectorSize`,
    /// `StensorSize`, `TensorSize`.
    pub fn as_string(&self, hypothesis: ModellingHypothesis) -> String {
        let _ = hypothesis; // the symbols are hypothesis-independent names;
                            // their *numeric* value varies per hypothesis at
                            // the C++ template-parameter level.
        let mut terms = Vec::new();
        if self.scalars != 0 {
            terms.push(self.scalars.to_string());
        }
        if self.tvectors != 0 {
            terms.push(format!("{}*TVectorSize", self.tvectors));
        }
        if self.stensors != 0 {
            terms.push(format!("{}*StensorSize", self.stensors));
        }
        if self.tensors != 0 {
            terms.push(format!("{}*TensorSize", self.tensors));
        }
        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join("+")
        }
    }

    pub fn checked_sub(self, rhs: TypeSize) -> Option<TypeSize> {
        let result = TypeSize {
            scalars: self.scalars - rhs.scalars,
            tvectors: self.tvectors - rhs.tvectors,
            stensors: self.stensors - rhs.stensors,
            tensors: self.tensors - rhs.tensors,
        };
        if result.scalars < 0 || result.tvectors < 0 || result.stensors < 0 || result.tensors < 0 {
            None
        } else {
            Some(result)
        }
    }
}

impl std::ops::Add for TypeSize {
    type Output = TypeSize;
    fn add(self, rhs: TypeSize) -> TypeSize {
        TypeSize {
            scalars: self.scalars + rhs.scalars,
            tvectors: self.tvectors + rhs.tvectors,
            stensors: self.stensors + rhs.stensors,
            tensors: self.tensors + rhs.tensors,
        }
    }
}

impl std::ops::AddAssign for TypeSize {
    fn add_assign(&mut self, rhs: TypeSize) {
        *self = *self + rhs;
    }
}

impl std::ops::Mul<i64> for TypeSize {
    type Output = TypeSize;
    fn mul(self, rhs: i64) -> TypeSize {
        TypeSize {
            scalars: self.scalars * rhs,
            tvectors: self.tvectors * rhs,
            stensors: self.stensors * rhs,
            tensors: self.tensors * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::ModellingHypothesis;

    #[test]
    fn scalar_classifies() {
        assert_eq!(classify("stress"), Some(SupportedTypeCategory::Scalar));
    }

    #[test]
    fn unknown_type_is_none() {
        assert_eq!(classify("Frobnicator"), None);
    }

    #[test]
    fn array_size_scales_type_size() {
        let one = TypeSize::of_variable(SupportedTypeCategory::Scalar, 1);
        let three = TypeSize::of_variable(SupportedTypeCategory::Scalar, 3);
        assert_eq!(three, one * 3);
    }

    #[test]
    fn addition_is_commutative_and_associative() {
        let a = TypeSize { scalars: 1, tvectors: 2, stensors: 0, tensors: 1 };
        let b = TypeSize { scalars: 3, tvectors: 0, stensors: 1, tensors: 0 };
        let c = TypeSize { scalars: 0, tvectors: 1, stensors: 2, tensors: 3 };
        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn subtraction_is_additions_inverse_when_nonnegative() {
        let a = TypeSize { scalars: 5, tvectors: 2, stensors: 1, tensors: 0 };
        let b = TypeSize { scalars: 2, tvectors: 1, stensors: 0, tensors: 0 };
        let diff = a.checked_sub(b).unwrap();
        assert_eq!(diff + b, a);
    }

    #[test]
    fn subtraction_rejects_negative_components() {
        let a = TypeSize { scalars: 1, ..TypeSize::ZERO };
        let b = TypeSize { scalars: 2, ..TypeSize::ZERO };
        assert!(a.checked_sub(b).is_none());
    }

    #[test]
    fn is_null_detects_zero() {
        assert!(TypeSize::ZERO.is_null());
        assert!(!TypeSize::of_variable(SupportedTypeCategory::Scalar, 1).is_null());
    }

    #[test]
    fn as_string_includes_dimension_symbols() {
        let size = TypeSize { scalars: 1, tvectors: 0, stensors: 2, tensors: 0 };
        let s = size.as_string(ModellingHypothesis::Tridimensional);
        assert_eq!(s, "1+2*StensorSize");
    }

    #[test]
    fn as_string_of_zero_is_zero_literal() {
        assert_eq!(TypeSize::ZERO.as_string(ModellingHypothesis::Undefined), "0");
    }

    #[test]
    fn derivative_of_two_scalars_is_scalar() {
        let s = TypeSize::of_category(SupportedTypeCategory::Scalar);
        let d = TypeSize::derivative_of(s, s);
        assert_eq!(d, TypeSize { scalars: 1, ..TypeSize::ZERO });
    }

    #[test]
    fn derivative_of_stensor_by_scalar_is_stensor() {
        let s = TypeSize::of_category(SupportedTypeCategory::Scalar);
        let st = TypeSize::of_category(SupportedTypeCategory::STensor);
        let d = TypeSize::derivative_of(st, s);
        assert_eq!(d.stensors, 1);
    }
}
