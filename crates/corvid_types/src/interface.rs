//! Structural interface satisfaction.
//!
//! A type satisfies an interface if it has every method the interface
//! declares, matched by name with identical parameter and return types —
//! there is no explicit `impl Interface for Type` declaration to check
//! against. This mirrors Go's structural typing rather than Rust's own
//! trait model.

use corvid_ast::TypeId;

use crate::table::{MethodSignature, Type, TypeTable};

/// Returns `true` if `methods` (the full method set attached to some
/// type, typically gathered from its `fn (receiver T) ...` declarations)
/// covers every method `iface` requires.
pub fn satisfies(table: &TypeTable, methods: &[MethodSignature], iface: TypeId) -> bool {
    let Type::Interface { methods: required, .. } = table.get(iface) else {
        return false;
    };
    required.iter().all(|req| methods.iter().any(|m| method_matches(m, req)))
}

fn method_matches(candidate: &MethodSignature, required: &MethodSignature) -> bool {
    candidate.name == required.name
        && candidate.ret == required.ret
        && candidate.params == required.params
}

/// Returns the names of interface methods not found in `methods`, for a
/// precise "missing method X" diagnostic rather than a bare yes/no.
pub fn missing_methods(
    table: &TypeTable,
    methods: &[MethodSignature],
    iface: TypeId,
) -> Vec<corvid_base::Symbol> {
    let Type::Interface { methods: required, .. } = table.get(iface) else {
        return Vec::new();
    };
    required
        .iter()
        .filter(|req| !methods.iter().any(|m| method_matches(m, req)))
        .map(|req| req.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_base::Interner;

    #[test]
    fn satisfies_when_every_method_present() {
        let mut interner = Interner::new();
        let area = interner.intern("area");
        let mut table = TypeTable::new();
        let iface = table.intern(Type::Interface {
            name: interner.intern("Shape"),
            methods: vec![MethodSignature { name: area, params: vec![], ret: TypeTable::F64 }],
        });
        let methods = vec![MethodSignature { name: area, params: vec![], ret: TypeTable::F64 }];
        assert!(satisfies(&table, &methods, iface));
    }

    #[test]
    fn fails_when_return_type_differs() {
        let mut interner = Interner::new();
        let area = interner.intern("area");
        let mut table = TypeTable::new();
        let iface = table.intern(Type::Interface {
            name: interner.intern("Shape"),
            methods: vec![MethodSignature { name: area, params: vec![], ret: TypeTable::F64 }],
        });
        let methods = vec![MethodSignature { name: area, params: vec![], ret: TypeTable::I32 }];
        assert!(!satisfies(&table, &methods, iface));
    }

    #[test]
    fn missing_methods_lists_the_gap() {
        let mut interner = Interner::new();
        let area = interner.intern("area");
        let perimeter = interner.intern("perimeter");
        let mut table = TypeTable::new();
        let iface = table.intern(Type::Interface {
            name: interner.intern("Shape"),
            methods: vec![
                MethodSignature { name: area, params: vec![], ret: TypeTable::F64 },
                MethodSignature { name: perimeter, params: vec![], ret: TypeTable::F64 },
            ],
        });
        let methods = vec![MethodSignature { name: area, params: vec![], ret: TypeTable::F64 }];
        let missing = missing_methods(&table, &methods, iface);
        assert_eq!(missing, vec![perimeter]);
    }
}
