//! Parameter Space
//!
//! Expands parameter declarations into the ordered list of combinations a
//! suite runs against.
//!
//! Expansion is an iterative pairwise reduction: every declaration starts as
//! its own list of single-assignment combinations, then the first two lists
//! are repeatedly replaced by their cross product (first list outer, second
//! inner) until one list is left.
//!
//! ```text
//! A:{1,2}  B:{x,y}  C:{p}
//!   [A1 A2] [Bx By] [Cp]
//!   [A1Bx A1By A2Bx A2By] [Cp]
//!   [A1BxCp A1ByCp A2BxCp A2ByCp]
//! ```

use crate::value::Value;
use std::collections::VecDeque;

/// A declared parameter: name and ordered, non-empty domain
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    name: String,
    values: Vec<Value>,
}

impl ParamDecl {
    /// Create a declaration
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain in declaration order
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// One parameter set to one of its domain values, by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    /// Index of the declaration
    pub param: usize,
    /// Index into the declaration's domain
    pub value: usize,
}

/// One point of the parameter space, assignments in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Combination {
    assignments: Vec<Assignment>,
}

impl Combination {
    /// Assignments in declaration order
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Whether this combination assigns nothing
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Resolve assignments to `(name, value)` pairs
    pub fn resolve<'a>(
        &'a self,
        decls: &'a [ParamDecl],
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.assignments.iter().filter_map(move |a| {
            let decl = decls.get(a.param)?;
            Some((decl.name(), decl.values.get(a.value)?))
        })
    }

    /// Render as `[name:value-name:value]`, or `[]` when empty
    pub fn label(&self, decls: &[ParamDecl]) -> String {
        let parts: Vec<String> = self
            .resolve(decls)
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect();
        format!("[{}]", parts.join("-"))
    }

    fn concat(&self, other: &Combination) -> Combination {
        let mut assignments = Vec::with_capacity(self.assignments.len() + other.assignments.len());
        assignments.extend_from_slice(&self.assignments);
        assignments.extend_from_slice(&other.assignments);
        Combination { assignments }
    }
}

/// Expand declarations into every combination, in deterministic order.
///
/// The result always has `∏ domain sizes` entries; with no declarations it is
/// a single empty combination.
pub fn expand(decls: &[ParamDecl]) -> Vec<Combination> {
    let mut lists: VecDeque<Vec<Combination>> = decls
        .iter()
        .enumerate()
        .map(|(param, decl)| {
            (0..decl.values.len())
                .map(|value| Combination {
                    assignments: vec![Assignment { param, value }],
                })
                .collect()
        })
        .collect();

    while lists.len() >= 2 {
        let (Some(outer), Some(inner)) = (lists.pop_front(), lists.pop_front()) else {
            break;
        };
        lists.push_front(cross(&outer, &inner));
    }

    lists
        .pop_front()
        .unwrap_or_else(|| vec![Combination::default()])
}

fn cross(outer: &[Combination], inner: &[Combination]) -> Vec<Combination> {
    let mut combined = Vec::with_capacity(outer.len() * inner.len());
    for left in outer {
        for right in inner {
            combined.push(left.concat(right));
        }
    }
    combined
}
