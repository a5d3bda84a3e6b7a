use std::io::Cursor;
use std::sync::Arc;

use roster::courses::{
    CandidateScanOptions, CatalogEditor, CatalogSeed, CourseId, CourseProgressService,
    CourseServiceError, EligibilityReason, InMemoryRoster, InstructorDesk, MemberId, MemberRole,
    RankId, Requester, SeedImportError,
};

const SEED: &str = include_str!("../../../services/api/seed/catalog.json");

fn seeded() -> (
    Arc<InMemoryRoster>,
    Arc<CourseProgressService<InMemoryRoster, InMemoryRoster>>,
) {
    let seed = CatalogSeed::from_reader(Cursor::new(SEED)).expect("bundled seed is valid");
    let roster = Arc::new(InMemoryRoster::from_seed(seed));
    let service = Arc::new(CourseProgressService::new(roster.clone(), roster.clone()));
    (roster, service)
}

fn available_codes(
    service: &CourseProgressService<InMemoryRoster, InMemoryRoster>,
    member_id: u32,
) -> Vec<String> {
    service
        .list_available(&MemberId(member_id))
        .expect("available courses")
        .into_iter()
        .map(|course| course.code)
        .collect()
}

#[test]
fn bundled_seed_resolves_each_member_stage() {
    let (_, service) = seeded();

    assert_eq!(available_codes(&service, 3), vec!["ASC-01", "TIR-01"]);
    assert_eq!(
        available_codes(&service, 4),
        vec!["ASC-02", "TIR-02", "MED-01"]
    );
    assert_eq!(available_codes(&service, 5), vec!["NAV-01"]);
    assert!(available_codes(&service, 6).is_empty());
}

#[test]
fn promotion_path_opens_once_the_previous_ascenso_is_recorded() {
    let (_, service) = seeded();

    let verdict = service
        .evaluate(&MemberId(5), &CourseId(3))
        .expect("verdict");
    assert_eq!(verdict.reason, Some(EligibilityReason::MissingPrerequisites));
    let missing: Vec<&str> = verdict
        .missing_prerequisites
        .iter()
        .map(|course| course.code.as_str())
        .collect();
    assert_eq!(missing, vec!["ASC-02"]);

    service
        .approve(&MemberId(5), &CourseId(2))
        .expect("record the missing rung");

    assert!(service
        .evaluate(&MemberId(5), &CourseId(3))
        .expect("verdict")
        .eligible);
    assert_eq!(available_codes(&service, 5), vec!["ASC-03", "NAV-01"]);

    let history = service.list_approved(&MemberId(5)).expect("history");
    assert_eq!(history[0].course.code, "ASC-02");
}

#[test]
fn instructor_workflow_over_the_seed() {
    let (roster, service) = seeded();
    let desk = InstructorDesk::new(service.clone());
    let instructor = Requester {
        member_id: MemberId(2),
        role: MemberRole::Formacion,
    };

    let scan = desk
        .candidates(
            &instructor,
            &CourseId(2),
            CandidateScanOptions {
                include_deleted: true,
                include_ineligible: false,
            },
        )
        .expect("scan");
    let eligible: Vec<MemberId> = scan.users.iter().map(|member| member.id).collect();
    assert_eq!(eligible, vec![MemberId(4), MemberId(7)]);

    desk.approve(&instructor, &CourseId(2), &MemberId(4))
        .expect("approval recorded");
    assert!(!available_codes(&service, 4).contains(&"ASC-02".to_string()));

    match desk.approve(&instructor, &CourseId(3), &MemberId(5)) {
        Err(CourseServiceError::Forbidden(_)) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }

    CatalogEditor::new(roster.clone(), roster)
        .add_instructor(&CourseId(3), &MemberId(2))
        .expect("instructor assigned");
    match desk.approve(&instructor, &CourseId(3), &MemberId(5)) {
        Err(CourseServiceError::NotEligible(verdict)) => {
            assert_eq!(verdict.reason, Some(EligibilityReason::MissingPrerequisites));
        }
        other => panic!("expected not eligible, got {other:?}"),
    }
}

#[test]
fn catalog_edits_are_visible_to_the_next_evaluation() {
    let (roster, service) = seeded();
    let editor = CatalogEditor::new(roster.clone(), roster);

    editor
        .add_prerequisite(&CourseId(6), &CourseId(4))
        .expect("new prerequisite");
    assert_eq!(available_codes(&service, 4), vec!["ASC-02", "TIR-02", "MED-01"]);

    editor
        .add_prerequisite(&CourseId(2), &CourseId(6))
        .expect("new prerequisite");
    assert_eq!(available_codes(&service, 4), vec!["TIR-02", "MED-01"]);

    editor
        .remove_unlock(&RankId(2), &CourseId(5))
        .expect("unlock removed");
    assert_eq!(available_codes(&service, 4), vec!["MED-01"]);
}

#[test]
fn seed_with_dangling_reference_is_rejected() {
    let broken = r#"{
        "courses": [{ "id": 1, "code": "A", "name": "A" }],
        "unlocks": [{ "rank_id": 3, "course_id": 1 }]
    }"#;

    match CatalogSeed::from_reader(Cursor::new(broken)) {
        Err(SeedImportError::Integrity(detail)) => assert!(detail.contains("unknown rank 3")),
        other => panic!("expected integrity error, got {other:?}"),
    }
}
