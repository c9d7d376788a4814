use crate::core::state::AppState;
use crate::domain::statistics::{
    self, AssignmentStatistics, CourseStatistics, StudentStatistics,
};
use crate::services::{load_assignment, ServiceResult};

pub async fn assignment_statistics(
    state: &AppState,
    tenant_id: &str,
    assignment_id: &str,
) -> ServiceResult<AssignmentStatistics> {
    let assignment = load_assignment(state, tenant_id, assignment_id).await?;
    let submissions =
        state.storage().list_submissions_by_assignment(tenant_id, assignment_id).await?;
    Ok(statistics::assignment_statistics(&assignment, &submissions))
}

pub async fn course_statistics(
    state: &AppState,
    tenant_id: &str,
    course_id: &str,
) -> ServiceResult<CourseStatistics> {
    let storage = state.storage();
    let assignments = storage.list_assignments_by_course(tenant_id, course_id).await?;

    let mut submissions = Vec::new();
    for assignment in &assignments {
        submissions
            .extend(storage.list_submissions_by_assignment(tenant_id, &assignment.id).await?);
    }
    Ok(statistics::course_statistics(course_id, &assignments, &submissions))
}

pub async fn student_statistics(
    state: &AppState,
    tenant_id: &str,
    student_id: &str,
) -> ServiceResult<StudentStatistics> {
    let submissions = state.storage().list_submissions_by_student(tenant_id, student_id).await?;
    Ok(statistics::student_statistics(student_id, &submissions))
}
