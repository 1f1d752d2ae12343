use uuid::Uuid;
use vrbuilder_core::behaviors::{
    DelayBehavior, ExecuteChaptersBehavior, MoveObjectBehavior, SetObjectLockedBehavior,
};
use vrbuilder_core::conditions::{
    GrabbedCondition, Quantifier, SnappedCondition, TimeoutCondition, ValueInRangeCondition,
};
use vrbuilder_core::entity::{
    Behavior, BehaviorEntity, Chapter, ConditionEntity, Entity, Process, Step, Transition,
};
use vrbuilder_core::error::ErrorKind;
use vrbuilder_core::registry::EntityRegistry;
use vrbuilder_core::scene::SceneReference;
use vrbuilder_core::serialization::{JsonProcessSerializer, ProcessDocument, ProcessSerializer};

fn parallel_chapter(name: &str) -> Chapter {
    let wait = ConditionEntity::new("wait", TimeoutCondition::new(0.5));
    Chapter::new(name).with_step(
        Step::new(format!("{name} step"))
            .with_transition(Transition::new().with_condition(wait)),
    )
}

fn training_process() -> Process {
    let tool = Uuid::new_v4();
    let bench = Uuid::new_v4();
    let parts = Uuid::new_v4();

    let lock_bench = Step::new("lock bench").with_behavior(BehaviorEntity::new(
        "lock",
        SetObjectLockedBehavior::new(SceneReference::object(bench), true),
    ));
    let lock_bench_id = lock_bench.id();

    let assemble = Step::new("assemble").with_transition(
        Transition::to(lock_bench_id)
            .with_condition(ConditionEntity::new(
                "grab all parts",
                GrabbedCondition::new(SceneReference::group(parts))
                    .with_quantifier(Quantifier::All)
                    .with_require_release(true),
            ))
            .with_condition(ConditionEntity::new(
                "dial",
                ValueInRangeCondition::new(SceneReference::object(tool), 2.0, 4.0),
            )),
    );
    let assemble_id = assemble.id();

    let prepare = Step::new("prepare")
        .with_description("Bring the tool to the bench.")
        .with_behavior(BehaviorEntity::new(
            "move tool",
            MoveObjectBehavior::new(
                SceneReference::object(tool),
                SceneReference::object(bench),
                24.7,
            ),
        ))
        .with_behavior(BehaviorEntity::new("pause", DelayBehavior::new(1.5).non_blocking()))
        .with_behavior(
            ExecuteChaptersBehavior::new("parallel")
                .with_chapter(parallel_chapter("Path 1"))
                .with_chapter(parallel_chapter("Path 2")),
        )
        .with_transition(Transition::to(assemble_id).with_condition(ConditionEntity::new(
            "snap",
            SnappedCondition::new(SceneReference::object(tool), SceneReference::object(bench)),
        )));

    let cleanup = Chapter::new("cleanup").with_step(lock_bench);

    Process::new("workshop", Chapter::new("main").with_step(prepare).with_step(assemble))
        .with_description("Tool handling")
        .with_chapter(cleanup)
}

#[test]
fn process_survives_json_round_trip() {
    let process = training_process();
    let serializer = JsonProcessSerializer::default().pretty();

    let bytes = serializer.serialize_process(&process).expect("serialize");
    let restored = serializer.deserialize_process(&bytes).expect("deserialize");

    assert_eq!(restored.id(), process.id());
    assert_eq!(restored.name(), "workshop");
    assert_eq!(restored.description(), "Tool handling");
    assert_eq!(
        ProcessDocument::from_process(&restored).expect("document"),
        ProcessDocument::from_process(&process).expect("document")
    );

    for (restored, original) in restored.chapters().iter().zip(process.chapters()) {
        assert_eq!(restored.id(), original.id());
        let ids = |chapter: &Chapter| chapter.steps().iter().map(Step::id).collect::<Vec<_>>();
        assert_eq!(ids(restored), ids(original));
    }
}

#[test]
fn transition_targets_in_other_chapters_survive() {
    let serializer = JsonProcessSerializer::default();
    let bytes = serializer
        .serialize_process(&training_process())
        .expect("serialize");
    let restored = serializer.deserialize_process(&bytes).expect("deserialize");

    let assemble = &restored.root_chapter().steps()[1];
    let target = assemble.transitions()[0].target().expect("branches out");
    let lock_bench = &restored.chapters()[1].steps()[0];
    assert_eq!(target, lock_bench.id());
    assert!(!restored.root_chapter().contains(target));

    let found = restored.find_step(target).expect("target resolves");
    assert_eq!(found.name(), "lock bench");
}

#[test]
fn behavior_parameters_are_preserved() {
    let serializer = JsonProcessSerializer::default();
    let bytes = serializer
        .serialize_process(&training_process())
        .expect("serialize");
    let restored = serializer.deserialize_process(&bytes).expect("deserialize");

    let behaviors = restored.root_chapter().steps()[0].behaviors();
    assert_eq!(behaviors.len(), 3);

    let movement = behaviors[0]
        .as_any()
        .downcast_ref::<BehaviorEntity<MoveObjectBehavior>>()
        .expect("move behavior");
    assert_eq!(movement.name(), "move tool");
    assert_eq!(movement.logic().duration, 24.7);

    let delay = behaviors[1]
        .as_any()
        .downcast_ref::<BehaviorEntity<DelayBehavior>>()
        .expect("delay behavior");
    assert!(!delay.is_blocking());

    let parallel = behaviors[2]
        .as_any()
        .downcast_ref::<ExecuteChaptersBehavior>()
        .expect("execute chapters behavior");
    let names: Vec<_> = parallel.chapters().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, ["Path 1", "Path 2"]);
}

#[test]
fn unknown_types_are_reported() {
    let mut registry = EntityRegistry::new();
    registry.register_condition::<TimeoutCondition>();
    let serializer = JsonProcessSerializer::new(registry);

    let bytes = JsonProcessSerializer::default()
        .serialize_process(&training_process())
        .expect("serialize");
    let err = serializer.deserialize_process(&bytes).err().expect("unknown types");
    assert_eq!(err.kind, ErrorKind::UnknownType);
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let err = JsonProcessSerializer::default()
        .deserialize_process(b"{ \"chapters\": ")
        .err()
        .expect("malformed input");
    assert_eq!(err.kind, ErrorKind::Serialization);
}
