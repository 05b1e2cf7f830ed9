use oxrdf::{Term, Variable};

/// A partial mapping from variables to terms (a SPARQL *solution mapping*).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Binding {
    values: Vec<(Variable, Term)>,
}

impl Binding {
    pub(crate) fn get(&self, variable: &Variable) -> Option<&Term> {
        self.values
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, term)| term)
    }

    /// Binds `variable`, replacing a previous value.
    pub(crate) fn insert(&mut self, variable: Variable, term: Term) {
        match self.values.iter_mut().find(|(v, _)| *v == variable) {
            Some((_, value)) => *value = term,
            None => self.values.push((variable, term)),
        }
    }

    /// Binds `variable` to `term` unless it is already bound to another term.
    ///
    /// Returns whether the binding is still consistent.
    pub(crate) fn unify(&mut self, variable: &Variable, term: &Term) -> bool {
        match self.get(variable) {
            Some(existing) => existing == term,
            None => {
                self.values.push((variable.clone(), term.clone()));
                true
            }
        }
    }

    /// Merges two compatible bindings. Returns `None` if they bind a variable differently.
    pub(crate) fn merge(&self, other: &Binding) -> Option<Binding> {
        let mut merged = self.clone();
        for (variable, term) in &other.values {
            if !merged.unify(variable, term) {
                return None;
            }
        }
        Some(merged)
    }

    pub(crate) fn is_compatible(&self, other: &Binding) -> bool {
        other
            .values
            .iter()
            .all(|(variable, term)| self.get(variable).map_or(true, |t| t == term))
    }

    pub(crate) fn shares_variable_with(&self, other: &Binding) -> bool {
        self.values
            .iter()
            .any(|(variable, _)| other.get(variable).is_some())
    }

    /// Keeps only the given variables.
    pub(crate) fn project(&self, variables: &[Variable]) -> Binding {
        let values = variables
            .iter()
            .filter_map(|variable| Some((variable.clone(), self.get(variable)?.clone())))
            .collect();
        Binding { values }
    }

    pub(crate) fn values_of(&self, variables: &[Variable]) -> Vec<Option<Term>> {
        variables.iter().map(|v| self.get(v).cloned()).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter().map(|(variable, term)| (variable, term))
    }

    /// A key that is equal for equal bindings, independent of the binding order.
    pub(crate) fn canonical_key(&self) -> Vec<(Variable, Term)> {
        let mut key = self.values.clone();
        key.sort_by(|(lhs, _), (rhs, _)| lhs.as_str().cmp(rhs.as_str()));
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn term(value: &str) -> Term {
        NamedNode::new_unchecked(format!("http://example.com/{value}")).into()
    }

    #[test]
    fn test_merge() {
        let x = Variable::new_unchecked("x");
        let y = Variable::new_unchecked("y");
        let mut left = Binding::default();
        left.insert(x.clone(), term("a"));
        let mut right = Binding::default();
        right.insert(y.clone(), term("b"));

        let merged = left.merge(&right).unwrap();
        assert_eq!(merged.get(&y), Some(&term("b")));

        let mut conflicting = Binding::default();
        conflicting.insert(x, term("c"));
        assert_eq!(left.merge(&conflicting), None);
        assert!(!left.shares_variable_with(&right));
    }

    #[test]
    fn test_canonical_key_ignores_order() {
        let mut a = Binding::default();
        a.insert(Variable::new_unchecked("x"), term("a"));
        a.insert(Variable::new_unchecked("y"), term("b"));
        let mut b = Binding::default();
        b.insert(Variable::new_unchecked("y"), term("b"));
        b.insert(Variable::new_unchecked("x"), term("a"));
        assert_ne!(a, b);
        assert_eq!(a.canonical_key(), b.canonical_key());
    }
}
