use course_client::{sort_by_seq_no, Course, CourseChanges};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_merge_only_touches_given_keys() {
    let course = Course::new("a", "BEGINNER", 2)
        .with("description", "Angular basics")
        .with("price", 50)
        .with("promo", false);

    let merged = course
        .merged(&CourseChanges::new().seq_no(5).set("promo", true))
        .unwrap();

    assert_eq!(
        merged,
        Course::new("a", "BEGINNER", 5)
            .with("description", "Angular basics")
            .with("price", 50)
            .with("promo", true)
    );
}

#[test]
fn test_merge_rejects_bad_types() {
    let course = Course::new("a", "BEGINNER", 2);
    assert!(course
        .merged(&CourseChanges::new().set("seqNo", "five"))
        .is_err());
}

#[test]
fn test_merge_adds_new_keys() {
    let course = Course::new("a", "BEGINNER", 2);
    let merged = course
        .merged(&CourseChanges::new().set("iconUrl", "a.png"))
        .unwrap();

    assert_eq!(merged.extra.get("iconUrl"), Some(&json!("a.png")));
    assert_eq!(merged.seq_no, 2);
}

#[test]
fn test_extra_fields_roundtrip() {
    let raw = json!({
        "id": "a",
        "category": "BEGINNER",
        "seqNo": 3,
        "description": "Angular basics",
        "lessonsCount": 10
    });
    let course: Course = serde_json::from_value(raw.clone()).unwrap();

    assert_eq!(course.description(), Some("Angular basics"));
    assert_eq!(serde_json::to_value(&course).unwrap(), raw);
}

#[test]
fn test_sort_is_stable() {
    let mut courses = vec![
        Course::new("a", "x", 2),
        Course::new("b", "x", 1),
        Course::new("c", "x", 2),
        Course::new("d", "x", 1),
    ];
    sort_by_seq_no(&mut courses);

    let ids: Vec<_> = courses.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "d", "a", "c"]);
}

#[test]
fn test_undo_restores_only_changed_keys() {
    let prior = Course::new("a", "x", 2).with("promo", false);
    let changes = CourseChanges::new().seq_no(5).set("iconUrl", "a.png");
    let current = prior
        .merged(&changes)
        .unwrap()
        .merged(&CourseChanges::new().set("title", "RxJs"))
        .unwrap();

    assert_eq!(
        current.undo(&prior, &changes).unwrap(),
        Course::new("a", "x", 2)
            .with("promo", false)
            .with("title", "RxJs")
    );
}

#[test]
fn test_undo_keeps_keys_changed_since() {
    let prior = Course::new("a", "x", 2);
    let changes = CourseChanges::new().seq_no(5);
    let current = prior
        .merged(&changes)
        .unwrap()
        .merged(&CourseChanges::new().seq_no(7))
        .unwrap();

    assert_eq!(current.undo(&prior, &changes).unwrap(), current);
}
