use crate::binding::Binding;
use crate::eval::{bound_value, term_to_subject, unify_term_pattern, SolutionEvaluator};
use oxrdf::{NamedNode, Term};
use rustc_hash::FxHashSet;
use spargebra::algebra::PropertyPathExpression;
use spargebra::term::TermPattern;
use std::collections::VecDeque;

impl SolutionEvaluator<'_> {
    /// Evaluates `subject path object`. Bound ends are used as the starting point of the walk.
    pub(crate) fn evaluate_path_pattern(
        &self,
        subject: &TermPattern,
        path: &PropertyPathExpression,
        object: &TermPattern,
    ) -> Vec<Binding> {
        let mut solutions = Vec::new();

        if let Some(start) = bound_value(subject, &self.seed) {
            for end in self.path_targets(path, &start, true) {
                let mut solution = self.seed.clone();
                if unify_term_pattern(&mut solution, object, &end) {
                    solutions.push(solution);
                }
            }
        } else if let Some(end) = bound_value(object, &self.seed) {
            for start in self.path_targets(path, &end, false) {
                let mut solution = self.seed.clone();
                if unify_term_pattern(&mut solution, subject, &start) {
                    solutions.push(solution);
                }
            }
        } else {
            for start in self.index.nodes() {
                for end in self.path_targets(path, &start, true) {
                    let mut solution = self.seed.clone();
                    if unify_term_pattern(&mut solution, subject, &start)
                        && unify_term_pattern(&mut solution, object, &end)
                    {
                        solutions.push(solution);
                    }
                }
            }
        }
        solutions
    }

    /// Returns the nodes reachable from `start` over `path`, walking backwards if `forward` is
    /// false.
    fn path_targets(&self, path: &PropertyPathExpression, start: &Term, forward: bool) -> Vec<Term> {
        match path {
            PropertyPathExpression::NamedNode(predicate) => self.step(predicate, start, forward),
            PropertyPathExpression::Reverse(inner) => self.path_targets(inner, start, !forward),
            PropertyPathExpression::Sequence(first, second) => {
                let (first, second) = if forward {
                    (first, second)
                } else {
                    (second, first)
                };
                self.path_targets(first, start, forward)
                    .iter()
                    .flat_map(|middle| self.path_targets(second, middle, forward))
                    .collect()
            }
            PropertyPathExpression::Alternative(lhs, rhs) => {
                let mut targets = self.path_targets(lhs, start, forward);
                targets.extend(self.path_targets(rhs, start, forward));
                targets
            }
            PropertyPathExpression::ZeroOrOne(inner) => {
                let mut seen = FxHashSet::default();
                seen.insert(start.clone());
                let mut targets = vec![start.clone()];
                for target in self.path_targets(inner, start, forward) {
                    if seen.insert(target.clone()) {
                        targets.push(target);
                    }
                }
                targets
            }
            PropertyPathExpression::ZeroOrMore(inner) => self.closure(inner, start, forward, true),
            PropertyPathExpression::OneOrMore(inner) => self.closure(inner, start, forward, false),
            PropertyPathExpression::NegatedPropertySet(excluded) => {
                if forward {
                    let Some(subject) = term_to_subject(start.clone()) else {
                        return Vec::new();
                    };
                    self.index
                        .triples_for_subject(&subject)
                        .filter(|triple| !excluded.contains(&triple.predicate))
                        .map(|triple| triple.object.clone())
                        .collect()
                } else {
                    self.index
                        .triples_for_object(start)
                        .filter(|triple| !excluded.contains(&triple.predicate))
                        .map(|triple| triple.subject.clone().into())
                        .collect()
                }
            }
        }
    }

    fn step(&self, predicate: &NamedNode, start: &Term, forward: bool) -> Vec<Term> {
        if forward {
            let Some(subject) = term_to_subject(start.clone()) else {
                return Vec::new();
            };
            self.index
                .objects_for_subject_predicate(&subject, predicate.as_ref())
                .cloned()
                .collect()
        } else {
            self.index
                .subjects_for_predicate_object(predicate.as_ref(), start)
                .map(|subject| subject.clone().into())
                .collect()
        }
    }

    /// Breadth-first transitive closure. Each node is reported once, so cycles terminate.
    fn closure(
        &self,
        inner: &PropertyPathExpression,
        start: &Term,
        forward: bool,
        include_start: bool,
    ) -> Vec<Term> {
        let mut seen = FxHashSet::default();
        let mut targets = Vec::new();
        if include_start {
            seen.insert(start.clone());
            targets.push(start.clone());
        }

        let mut queue = VecDeque::from([start.clone()]);
        while let Some(current) = queue.pop_front() {
            for next in self.path_targets(inner, &current, forward) {
                if seen.insert(next.clone()) {
                    targets.push(next.clone());
                    queue.push_back(next);
                }
            }
        }
        targets
    }
}
