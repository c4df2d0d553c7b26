//! Numeric promotion: combining two operand types for a binary arithmetic
//! or comparison expression.
//!
//! Promotion only ever widens within a single category — signed integers,
//! unsigned integers, or floats. Mixing categories (signed with unsigned,
//! or either with float) is never implicit; the checker reports a type
//! error and the expression's resolved type becomes `error`.

use corvid_ast::TypeId;

use crate::table::{FloatKind, IntKind, Type, TypeTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NumericCategory {
    Signed,
    Unsigned,
    Float,
}

fn category(ty: &Type) -> Option<NumericCategory> {
    match ty {
        Type::Int(kind) if kind.is_signed() => Some(NumericCategory::Signed),
        Type::Int(_) => Some(NumericCategory::Unsigned),
        Type::Float(_) => Some(NumericCategory::Float),
        _ => None,
    }
}

/// Returns the promoted type for a binary operation between `left` and
/// `right`, or `None` if the pair can't be promoted (different numeric
/// categories, or one side isn't numeric at all).
pub fn promote(table: &TypeTable, left: TypeId, right: TypeId) -> Option<TypeId> {
    if left == right {
        return table.is_numeric(left).then_some(left);
    }
    let left_ty = table.get(left);
    let right_ty = table.get(right);
    let (left_cat, right_cat) = (category(left_ty)?, category(right_ty)?);
    if left_cat != right_cat {
        return None;
    }
    match (left_ty, right_ty) {
        (Type::Int(a), Type::Int(b)) => Some(if a.width_rank() >= b.width_rank() { left } else { right }),
        (Type::Float(a), Type::Float(b)) => Some(wider_float(*a, *b, left, right)),
        _ => None,
    }
}

fn wider_float(a: FloatKind, b: FloatKind, left: TypeId, right: TypeId) -> TypeId {
    match (a, b) {
        (FloatKind::F64, _) | (_, FloatKind::F64) => {
            if a == FloatKind::F64 {
                left
            } else {
                right
            }
        }
        _ => left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_promotes_to_itself() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::I32, TypeTable::I32), Some(TypeTable::I32));
    }

    #[test]
    fn wider_signed_int_wins() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::I32, TypeTable::I64), Some(TypeTable::I64));
        assert_eq!(promote(&table, TypeTable::I64, TypeTable::I32), Some(TypeTable::I64));
    }

    #[test]
    fn signed_and_unsigned_do_not_mix() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::I32, TypeTable::U32), None);
    }

    #[test]
    fn float_and_int_do_not_mix() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::I32, TypeTable::F32), None);
    }

    #[test]
    fn wider_float_wins() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::F32, TypeTable::F64), Some(TypeTable::F64));
    }

    #[test]
    fn non_numeric_operand_fails_to_promote() {
        let table = TypeTable::new();
        assert_eq!(promote(&table, TypeTable::I32, TypeTable::STR), None);
    }
}
