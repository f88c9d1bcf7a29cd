//! Atomic profile + enrollment writer.
//!
//! Registering a student derives their course list from the program's
//! semester curriculum and commits the profile together with one
//! enrollment per course as a single batch. All validation happens before
//! any write is attempted; the batch itself is all-or-nothing by the
//! store's guarantee, so no partially-enrolled student is ever observable.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::model::{Enrollment, EnrollmentStatus, Program, Role, UserProfile};
use crate::store::{collections, DocumentStore, WriteBatch};

/// Registration input collected by the admin-side form.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    /// Role-specific id: student number or faculty id.
    pub custom_id: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentReceipt {
    pub uid: String,
    pub enrolled_courses: Vec<String>,
}

pub struct EnrollmentWriter {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl EnrollmentWriter {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a profile and, for students, the full set of enrollment
    /// records implied by the program's semester curriculum.
    ///
    /// Non-students skip curriculum resolution and get a profile-only
    /// write. Failures before the commit surface as typed validation
    /// errors with no partial state; a commit failure surfaces verbatim as
    /// [`CoreError::BatchWriteFailed`] and is not retried.
    pub async fn create_profile_and_enroll(
        &self,
        user: NewUser,
        program_id: Option<&str>,
        semester: u32,
    ) -> Result<EnrollmentReceipt> {
        let (program_id, courses) = if user.role == Role::Student {
            let program_id = program_id
                .filter(|p| !p.is_empty())
                .ok_or(CoreError::MissingProgram)?;
            let courses = self.resolve_curriculum(program_id, semester).await?;
            (Some(program_id.to_string()), courses)
        } else {
            (None, Vec::new())
        };

        let profile = build_profile(&user, semester, self.clock.as_ref());

        let mut batch = WriteBatch::new();
        batch
            .set(collections::USERS, &user.uid, &profile)
            .map_err(CoreError::BatchWriteFailed)?;

        let academic_year = self.clock.academic_year();
        for course_code in &courses {
            let enrollment = Enrollment {
                student_id: user.uid.clone(),
                course_code: course_code.clone(),
                // Curriculum resolution only succeeds with a program id.
                program_id: program_id.clone().unwrap_or_default(),
                semester,
                academic_year,
                status: EnrollmentStatus::Active,
            };
            batch
                .add(collections::ENROLLMENTS, &enrollment)
                .map_err(CoreError::BatchWriteFailed)?;
        }

        debug!(uid = %user.uid, records = batch.len(), "committing registration batch");
        self.store
            .commit(batch)
            .await
            .map_err(CoreError::BatchWriteFailed)?;

        info!(
            uid = %user.uid,
            role = ?user.role,
            courses = courses.len(),
            "profile and enrollments created"
        );
        Ok(EnrollmentReceipt {
            uid: user.uid,
            enrolled_courses: courses,
        })
    }

    /// Look up the program document and pull the `"sem<N>"` course list.
    async fn resolve_curriculum(&self, program_id: &str, semester: u32) -> Result<Vec<String>> {
        let doc = self
            .store
            .get(collections::PROGRAMS, program_id)
            .await
            .map_err(CoreError::QueryFailed)?
            .ok_or_else(|| CoreError::ProgramNotFound(program_id.to_string()))?;

        let program: Program = doc
            .decode()
            .map_err(|_| CoreError::CorruptProgramData(program_id.to_string()))?;

        program
            .semester_courses
            .get(&Program::semester_key(semester))
            .filter(|courses| !courses.is_empty())
            .cloned()
            .ok_or_else(|| CoreError::NoCoursesForSemester {
                program_id: program_id.to_string(),
                semester,
            })
    }
}

fn build_profile(user: &NewUser, semester: u32, clock: &dyn Clock) -> UserProfile {
    let mut contact_info = HashMap::new();
    contact_info.insert("mobile".to_string(), user.mobile.clone());

    let is_student = user.role == Role::Student;
    UserProfile {
        uid: user.uid.clone(),
        email: user.email.clone(),
        role: user.role,
        name: format!("{} {}", user.first_name, user.last_name),
        profile_image_url: user.image_url.clone(),
        contact_info,
        current_semester: is_student.then_some(semester),
        student_id: is_student.then(|| user.custom_id.clone()),
        faculty_id: (!is_student).then(|| user.custom_id.clone()),
        created_at: clock.now(),
    }
}
