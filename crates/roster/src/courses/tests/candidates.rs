use super::common::*;
use crate::courses::domain::{Course, CourseId, MemberId, MemberRole};
use crate::courses::eligibility::EligibilityReason;
use crate::courses::service::CourseServiceError;
use crate::courses::views::CandidateScanOptions;

fn scan_fixture() -> Fixture {
    let fixture = ladder_fixture();
    fixture
        .member(11, Some(2))
        .member(12, Some(1))
        .member(13, None)
        .member_with(14, Some(2), MemberRole::User, Some(approved_at(6)))
        .approved(10, 1, 1)
        .approved(14, 1, 1);
    fixture
}

fn member_ids(scan: &crate::courses::views::CandidateScan) -> Vec<MemberId> {
    scan.users.iter().map(|member| member.id).collect()
}

#[test]
fn scan_returns_only_eligible_members_by_default() {
    let fixture = scan_fixture();

    let scan = fixture
        .service()
        .list_candidates(&CourseId(2), CandidateScanOptions::default())
        .expect("scan");

    assert_eq!(scan.course_id, CourseId(2));
    assert_eq!(member_ids(&scan), vec![MemberId(10)]);
    assert!(scan.ineligible.is_none());
}

#[test]
fn scan_reports_ineligible_members_with_reasons() {
    let fixture = scan_fixture();

    let scan = fixture
        .service()
        .list_candidates(
            &CourseId(2),
            CandidateScanOptions {
                include_deleted: false,
                include_ineligible: true,
            },
        )
        .expect("scan");

    let ineligible = scan.ineligible.expect("ineligible list requested");
    let reasons: Vec<(MemberId, Option<EligibilityReason>)> = ineligible
        .iter()
        .map(|candidate| (candidate.member.id, candidate.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (MemberId(11), Some(EligibilityReason::MissingPrerequisites)),
            (MemberId(12), Some(EligibilityReason::NotUnlocked)),
            (MemberId(13), Some(EligibilityReason::NoRank)),
        ]
    );
    assert_eq!(codes(&ineligible[0].missing_prerequisites), vec!["ASC-1"]);
}

#[test]
fn scan_can_include_soft_deleted_members() {
    let fixture = scan_fixture();

    let scan = fixture
        .service()
        .list_candidates(
            &CourseId(2),
            CandidateScanOptions {
                include_deleted: true,
                include_ineligible: false,
            },
        )
        .expect("scan");

    assert_eq!(member_ids(&scan), vec![MemberId(10), MemberId(14)]);
    assert!(scan.users[1].deleted_at.is_some());
}

#[test]
fn scan_excludes_members_who_already_hold_the_course() {
    let fixture = scan_fixture();
    fixture.approved(11, 3, 2);

    let scan = fixture
        .service()
        .list_candidates(&CourseId(3), CandidateScanOptions::default())
        .expect("scan");

    assert_eq!(member_ids(&scan), vec![MemberId(10)]);
}

#[test]
fn scan_of_unknown_course_is_not_found() {
    let fixture = scan_fixture();

    match fixture
        .service()
        .list_candidates(&CourseId(404), CandidateScanOptions::default())
    {
        Err(CourseServiceError::NotFound("course")) => {}
        other => panic!("expected course not found, got {other:?}"),
    }
}

#[test]
fn scan_agrees_with_single_member_evaluation() {
    let fixture = scan_fixture();
    let service = fixture.service();

    let scan = service
        .list_candidates(&CourseId(3), CandidateScanOptions::default())
        .expect("scan");

    for member_id in [MemberId(10), MemberId(11), MemberId(12), MemberId(13)] {
        let eligible = service
            .evaluate(&member_id, &CourseId(3))
            .expect("verdict")
            .eligible;
        assert_eq!(eligible, member_ids(&scan).contains(&member_id));
    }
}

#[test]
fn off_ladder_flagged_course_is_positioned_by_its_lowest_unlocking_rank() {
    let fixture = Fixture::new();
    fixture
        .rank(1, 0)
        .rank(2, 1)
        .rank(3, 2)
        .course(ascenso(1, "ASC-1", false))
        .course(Course {
            requires_all_previous_ascenso: true,
            ..course(9, "PUENTE")
        })
        .unlock(2, 1)
        .unlock(1, 9)
        .unlock(3, 9)
        .member(10, Some(1))
        .member(11, Some(3));
    let service = fixture.service();

    let low = service
        .evaluate(&MemberId(10), &CourseId(9))
        .expect("verdict");
    let high = service
        .evaluate(&MemberId(11), &CourseId(9))
        .expect("verdict");
    assert!(low.eligible);
    assert_eq!(low, high);

    let scan = service
        .list_candidates(
            &CourseId(9),
            CandidateScanOptions {
                include_deleted: false,
                include_ineligible: true,
            },
        )
        .expect("scan");
    assert_eq!(member_ids(&scan), vec![MemberId(10), MemberId(11)]);
    assert_eq!(scan.ineligible.map(|rows| rows.len()), Some(0));
}

#[test]
fn off_ladder_flagged_course_above_a_rung_requires_it_for_every_rank() {
    let fixture = Fixture::new();
    fixture
        .rank(1, 0)
        .rank(2, 1)
        .rank(3, 2)
        .course(ascenso(1, "ASC-1", false))
        .course(Course {
            requires_all_previous_ascenso: true,
            ..course(9, "PUENTE")
        })
        .unlock(1, 1)
        .unlock(2, 9)
        .unlock(3, 9)
        .member(10, Some(2))
        .member(11, Some(3));
    let service = fixture.service();

    for member_id in [MemberId(10), MemberId(11)] {
        let verdict = service.evaluate(&member_id, &CourseId(9)).expect("verdict");
        assert_eq!(verdict.reason, Some(EligibilityReason::MissingPrerequisites));
        assert_eq!(codes(&verdict.missing_prerequisites), vec!["ASC-1"]);
        assert!(service
            .list_available(&member_id)
            .expect("available")
            .is_empty());
    }
}
