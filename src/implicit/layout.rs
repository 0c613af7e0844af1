//! Unknown-vector layout and Jacobian block views (spec.md §4.5,
//! "Unknown vector layout", "Block views `df<a>_dd<b>`").
//!
//! Integration variables are laid out in declaration order; each gets a
//! cumulative [`TypeSize`] offset into the flat unknown vector. A view is
//! generated per variable so author code can write `Δy`-style expressions;
//! for a pair of variables `(a, b)` a Jacobian block view locates the
//! `(offset(a), offset(b))` cell with dimensions `(|a|, |b|)`.

use std::collections::HashMap;

use crate::ast::variable::Variable;
use crate::typesize::TypeSize;

/// The kind of generated view over the flat unknown/residual/Jacobian
/// buffer (spec.md §4.5 design notes, "Variable views").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// A scalar variable: a direct lvalue reference to one cell.
    ScalarRef,
    /// A tensor-shaped variable with a fixed (non-array) size: a map
    /// constructor over a compile-time offset.
    FixedView,
    /// An array of tensor-shaped values: a lambda-indexed view so the
    /// author can write `dv[i]`.
    LambdaIndexedView,
}

impl ViewKind {
    pub fn for_variable(v: &Variable) -> ViewKind {
        if v.array_size > 1 {
            ViewKind::LambdaIndexedView
        } else if v.is_scalar() {
            ViewKind::ScalarRef
        } else {
            ViewKind::FixedView
        }
    }
}

/// The offset and size of one integration variable's slice of the
/// unknown/residual vector.
#[derive(Debug, Clone)]
pub struct VariableSlot {
    pub name: String,
    pub offset: TypeSize,
    pub size: TypeSize,
    pub view_kind: ViewKind,
}

/// Lays out every integration variable in declaration order, assigning
/// cumulative offsets (spec.md §4.5, testable property 5: Jacobian layout).
#[derive(Debug, Clone, Default)]
pub struct UnknownVectorLayout {
    slots: Vec<VariableSlot>,
}

impl UnknownVectorLayout {
    pub fn build(variables: &[&Variable]) -> Self {
        let mut offset = TypeSize::ZERO;
        let mut slots = Vec::with_capacity(variables.len());
        for v in variables {
            let size = v.type_size();
            slots.push(VariableSlot {
                name: v.name.clone(),
                offset,
                size,
                view_kind: ViewKind::for_variable(v),
            });
            offset += size;
        }
        Self { slots }
    }

    pub fn total_size(&self) -> TypeSize {
        self.slots.iter().fold(TypeSize::ZERO, |acc, s| acc + s.size)
    }

    pub fn slot(&self, name: &str) -> Option<&VariableSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slots(&self) -> &[VariableSlot] {
        &self.slots
    }
}

/// A `df<a>_dd<b>` Jacobian block view: the sub-matrix occupying rows
/// `[offset(a), offset(a)+|a|)` and columns `[offset(b), offset(b)+|b|)`
/// of the flat Jacobian buffer.
#[derive(Debug, Clone)]
pub struct JacobianBlockView {
    pub row_variable: String,
    pub column_variable: String,
    pub row_offset: TypeSize,
    pub column_offset: TypeSize,
    pub row_size: TypeSize,
    pub column_size: TypeSize,
}

impl JacobianBlockView {
    pub fn member_name(&self) -> String {
        format!("df{}_dd{}", self.row_variable, self.column_variable)
    }
}

/// Builds every `(a, b)` block view for the Cartesian product of integration
/// variables, per spec.md §4.5.
pub fn jacobian_blocks(layout: &UnknownVectorLayout) -> Vec<JacobianBlockView> {
    let mut blocks = Vec::new();
    for a in layout.slots() {
        for b in layout.slots() {
            blocks.push(JacobianBlockView {
                row_variable: a.name.clone(),
                column_variable: b.name.clone(),
                row_offset: a.offset,
                column_offset: b.offset,
                row_size: a.size,
                column_size: b.size,
            });
        }
    }
    blocks
}

/// Verifies testable property 5: every distinct pair of variables maps to
/// disjoint `(row, column)` cell ranges.
pub fn blocks_are_disjoint(blocks: &[JacobianBlockView]) -> bool {
    let mut seen: HashMap<(String, String), ()> = HashMap::new();
    for b in blocks {
        let key = (b.row_variable.clone(), b.column_variable.clone());
        if seen.insert(key, ()).is_some() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::variable::Variable;
    use crate::typesize::SupportedTypeCategory;

    fn var(type_name: &str, name: &str, array_size: u32) -> Variable {
        let mut v = Variable::new(type_name, name, 1);
        v.array_size = array_size;
        v
    }

    #[test]
    fn layout_accumulates_offsets_in_order() {
        let eel = var("StrainStensor", "eel", 1);
        let p = var("real", "p", 1);
        let vars = vec![&eel, &p];
        let layout = UnknownVectorLayout::build(&vars);
        assert_eq!(layout.slot("eel").unwrap().offset, TypeSize::ZERO);
        assert_eq!(layout.slot("p").unwrap().offset.stensors, 1);
    }

    #[test]
    fn array_variable_gets_lambda_indexed_view() {
        let arr = var("real", "g", 3);
        assert_eq!(ViewKind::for_variable(&arr), ViewKind::LambdaIndexedView);
    }

    #[test]
    fn scalar_variable_gets_scalar_ref() {
        let s = var("real", "p", 1);
        assert_eq!(ViewKind::for_variable(&s), ViewKind::ScalarRef);
    }

    #[test]
    fn tensor_variable_gets_fixed_view() {
        let t = var("StrainStensor", "eel", 1);
        assert_eq!(ViewKind::for_variable(&t), ViewKind::FixedView);
    }

    #[test]
    fn jacobian_blocks_cover_full_cartesian_product() {
        let eel = var("StrainStensor", "eel", 1);
        let p = var("real", "p", 1);
        let vars = vec![&eel, &p];
        let layout = UnknownVectorLayout::build(&vars);
        let blocks = jacobian_blocks(&layout);
        assert_eq!(blocks.len(), 4);
        assert!(blocks_are_disjoint(&blocks));
    }

    #[test]
    fn block_member_name_matches_spec_convention() {
        let eel = var("StrainStensor", "eel", 1);
        let p = var("real", "p", 1);
        let vars = vec![&eel, &p];
        let layout = UnknownVectorLayout::build(&vars);
        let blocks = jacobian_blocks(&layout);
        let b = blocks.iter().find(|b| b.row_variable == "eel" && b.column_variable == "p").unwrap();
        assert_eq!(b.member_name(), "dfeel_ddp");
    }

    #[test]
    fn block_offsets_match_variable_slots() {
        let a = var(
            "real",
            "a",
            1,
        );
        let b = var("real", "b", 1);
        let vars = vec![&a, &b];
        let layout = UnknownVectorLayout::build(&vars);
        let blocks = jacobian_blocks(&layout);
        let ab = blocks.iter().find(|blk| blk.row_variable == "a" && blk.column_variable == "b").unwrap();
        assert_eq!(ab.row_offset, layout.slot("a").unwrap().offset);
        assert_eq!(ab.column_offset, layout.slot("b").unwrap().offset);
        let _ = SupportedTypeCategory::Scalar;
    }
}
