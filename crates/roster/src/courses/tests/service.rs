use super::common::*;
use crate::courses::domain::{CourseId, MemberId, MemberRole};
use crate::courses::repository::MemberRepository;
use crate::courses::service::CourseServiceError;

#[test]
fn approve_twice_conflicts_without_duplicating_the_edge() {
    let fixture = ladder_fixture();
    let service = fixture.service();

    let approved = service
        .approve(&MemberId(10), &CourseId(3))
        .expect("first approval");
    assert_eq!(approved.course.code, "MED-1");

    match service.approve(&MemberId(10), &CourseId(3)) {
        Err(CourseServiceError::Conflict(message)) => {
            assert_eq!(message, "course already approved for this member")
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let history = service.list_approved(&MemberId(10)).expect("approved list");
    assert_eq!(history.len(), 1);
}

#[test]
fn unapprove_twice_reports_not_found_the_second_time() {
    let fixture = ladder_fixture();
    fixture.approved(10, 3, 2);
    let service = fixture.service();

    service
        .unapprove(&MemberId(10), &CourseId(3))
        .expect("first removal");

    match service.unapprove(&MemberId(10), &CourseId(3)) {
        Err(CourseServiceError::NotFound("approved course")) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn approve_rejects_unknown_courses_and_members() {
    let fixture = ladder_fixture();
    let service = fixture.service();

    assert!(matches!(
        service.approve(&MemberId(10), &CourseId(404)),
        Err(CourseServiceError::NotFound("course"))
    ));
    assert!(matches!(
        service.approve(&MemberId(404), &CourseId(3)),
        Err(CourseServiceError::NotFound("member"))
    ));
}

#[test]
fn approve_does_not_consult_eligibility() {
    let fixture = ladder_fixture();
    let service = fixture.service();

    service
        .approve(&MemberId(10), &CourseId(2))
        .expect("direct approval bypasses the evaluator");

    let edges = fixture
        .roster
        .approvals_for_courses(&[CourseId(2)])
        .expect("edges");
    assert_eq!(edges.len(), 1);
}

#[test]
fn approved_history_is_newest_first_with_id_tiebreak() {
    let fixture = Fixture::new();
    fixture
        .rank(1, 0)
        .course(course(1, "A"))
        .course(course(2, "B"))
        .course(course(3, "C"))
        .member(7, Some(1))
        .approved(7, 1, 5)
        .approved(7, 2, 9)
        .approved(7, 3, 5);

    let history = fixture
        .service()
        .list_approved(&MemberId(7))
        .expect("approved list");

    let ordered: Vec<&str> = history.iter().map(|entry| entry.course.code.as_str()).collect();
    assert_eq!(ordered, vec!["B", "C", "A"]);
}

#[test]
fn dashboard_combines_history_and_open_courses() {
    let fixture = ladder_fixture();
    fixture.approved(10, 1, 3);

    let dashboard = fixture
        .service()
        .dashboard(&MemberId(10))
        .expect("dashboard");

    assert_eq!(dashboard.member.id, MemberId(10));
    assert_eq!(dashboard.member.role, MemberRole::User);
    assert_eq!(dashboard.member.rank.as_ref().map(|rank| rank.sort_order), Some(1));
    assert_eq!(dashboard.counts.approved, 1);
    assert_eq!(dashboard.counts.available, 2);
    assert_eq!(codes(&dashboard.available), vec!["ASC-2", "MED-1"]);
}

#[test]
fn dashboard_for_member_without_rank_lists_history_only() {
    let fixture = ladder_fixture();
    fixture.member(12, None).approved(12, 3, 1);

    let dashboard = fixture
        .service()
        .dashboard(&MemberId(12))
        .expect("dashboard");

    assert_eq!(dashboard.counts.approved, 1);
    assert!(dashboard.available.is_empty());
}
