use crate::error::Result;

use super::{available_requests, begin, finish, Request, Stage, ALL_STAGES};

/// Stage graph derived from the guard tables.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StageGraph {
    pub stages: Vec<Stage>,
    pub edges: Vec<StageEdge>,
}

/// Directed edge: a request taken from `start` enters `transient`, which settles in `rest`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StageEdge {
    pub start: Stage,
    pub request: Request,
    pub transient: Stage,
    pub rest: Stage,
}

/// Build the canonical stage graph.
pub fn stage_graph() -> Result<StageGraph> {
    let mut edges = Vec::new();

    for stage in ALL_STAGES {
        for request in available_requests(stage) {
            let transient = begin(stage, *request)?;
            edges.push(StageEdge {
                start: stage,
                request: *request,
                transient,
                rest: finish(transient),
            });
        }
    }

    Ok(StageGraph {
        stages: ALL_STAGES.to_vec(),
        edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_contains_all_stages_and_expected_edges() {
        let graph = stage_graph().unwrap();

        assert_eq!(graph.stages.len(), ALL_STAGES.len());

        let expected = [
            (Stage::Inactive, Request::Activate, Stage::Activating, Stage::Active),
            (Stage::Active, Request::Deactivate, Stage::Deactivating, Stage::Inactive),
            (Stage::Active, Request::Abort, Stage::Aborting, Stage::Inactive),
            (Stage::Activating, Request::Abort, Stage::Aborting, Stage::Inactive),
            (Stage::Deactivating, Request::Abort, Stage::Aborting, Stage::Inactive),
        ];

        for (start, request, transient, rest) in expected {
            assert!(
                graph.edges.iter().any(|edge| {
                    edge.start == start
                        && edge.request == request
                        && edge.transient == transient
                        && edge.rest == rest
                }),
                "missing edge {start:?} -> {request:?} -> {transient:?} -> {rest:?}"
            );
        }

        assert_eq!(graph.edges.len(), expected.len());
    }
}
