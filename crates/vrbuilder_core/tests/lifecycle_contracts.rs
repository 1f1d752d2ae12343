use vrbuilder_core::error::{ErrorKind, Payload};
use vrbuilder_core::lifecycle::{
    available_requests, begin, finish, stage_graph, Request, Stage, ALL_STAGES,
};

#[test]
fn requests_move_into_expected_transient_stage() {
    let cases = [
        (Stage::Inactive, Request::Activate, Stage::Activating, Stage::Active),
        (Stage::Active, Request::Deactivate, Stage::Deactivating, Stage::Inactive),
        (Stage::Activating, Request::Abort, Stage::Aborting, Stage::Inactive),
        (Stage::Active, Request::Abort, Stage::Aborting, Stage::Inactive),
        (Stage::Deactivating, Request::Abort, Stage::Aborting, Stage::Inactive),
    ];

    for (start, request, transient, rest) in cases {
        let next = begin(start, request).expect("begin should succeed");
        assert_eq!(next, transient);
        assert!(next.is_transient());
        assert_eq!(finish(next), rest);
        assert!(finish(next).is_stable());
    }
}

#[test]
fn rejected_requests_are_invalid_state() {
    let cases = [
        (Stage::Inactive, Request::Deactivate),
        (Stage::Inactive, Request::Abort),
        (Stage::Active, Request::Activate),
        (Stage::Activating, Request::Activate),
        (Stage::Activating, Request::Deactivate),
        (Stage::Deactivating, Request::Deactivate),
        (Stage::Aborting, Request::Activate),
        (Stage::Aborting, Request::Deactivate),
    ];

    for (start, request) in cases {
        let err = begin(start, request).expect_err("request should be rejected");
        assert_eq!(err.kind, ErrorKind::InvalidState);
        assert_eq!(
            err.payload,
            Payload::StageRequest {
                from_stage: start.id(),
                via_request: request.id()
            }
        );
    }
}

#[test]
fn available_requests_agree_with_guards() {
    let requests = [Request::Activate, Request::Deactivate, Request::Abort];

    for stage in ALL_STAGES {
        for request in requests {
            let listed = available_requests(stage).contains(&request);
            assert_eq!(
                listed,
                begin(stage, request).is_ok(),
                "{stage} / {}",
                request.label()
            );
        }
    }
}

#[test]
fn stage_graph_matches_guards() {
    let graph = stage_graph().expect("stage graph");
    assert_eq!(graph.stages.len(), ALL_STAGES.len());

    for edge in &graph.edges {
        assert_eq!(begin(edge.start, edge.request).unwrap(), edge.transient);
        assert_eq!(finish(edge.transient), edge.rest);
    }
}

#[test]
fn transient_stages_always_resolve_to_stable() {
    for stage in ALL_STAGES {
        let rest = finish(stage);
        assert!(rest.is_stable(), "{stage} resolves to {rest}");
    }
}
