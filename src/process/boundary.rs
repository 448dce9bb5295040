//! Variables crossing the boundary of a replaced discipline group

use super::{CandidateGroup, DesignGraph};
use crate::Result;
use serde::{Deserialize, Serialize};

/// External inputs and outputs a surrogate for a group must expose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryIo {
    /// Variables the surrogate must be supplied with
    pub inputs: Vec<String>,
    /// Variables the surrogate must produce for the rest of the workflow
    pub outputs: Vec<String>,
}

impl BoundaryIo {
    /// Surrogate input dimensionality.
    #[must_use]
    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }
}

/// Compute the external inputs and outputs of `group`.
///
/// For the member at position `i`:
/// - an input is external if one of its sources lies outside the members
///   that can supply it (all members when converged, otherwise only
///   `members[..i]`); with `only_non_const`, constant sources are ignored
/// - an output is external if one of its targets lies outside
///   `members[i..]`
///
/// Variables are reported once, in first-seen order.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownDiscipline`] if a member is not part of
/// the graph.
pub fn io_for_replaced(
    graph: &dyn DesignGraph,
    group: &CandidateGroup,
    only_non_const: bool,
) -> Result<BoundaryIo> {
    let members = group.members();
    let mut io = BoundaryIo::default();

    for (idx, member) in members.iter().enumerate() {
        let suppliers = if group.is_converged() {
            members
        } else {
            &members[..idx]
        };

        for variable in graph.inputs_of(member)? {
            if io.inputs.contains(&variable) {
                continue;
            }
            let external = graph.sources_of(&variable).iter().any(|source| {
                !suppliers.contains(source)
                    && !(only_non_const && graph.is_constant_source(source))
            });
            if external {
                io.inputs.push(variable);
            }
        }

        let consumers = &members[idx..];
        for variable in graph.outputs_of(member)? {
            if io.outputs.contains(&variable) {
                continue;
            }
            if graph
                .targets_of(&variable)
                .iter()
                .any(|target| !consumers.contains(target))
            {
                io.outputs.push(variable);
            }
        }
    }

    Ok(io)
}
