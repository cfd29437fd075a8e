// src/templates.rs
use crate::models::{
    attendance::{AttendanceViewRow, RosterEntry},
    class::Class,
    student::StudentWithClass,
};
use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
    pub info: Option<String>,
    // Same-origin path to return to after login, echoed into a hidden field.
    pub next: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub error: Option<String>,
    // Redisplayed so a validation failure doesn't wipe the input.
    pub username: String,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub username: String,
    pub success_message: Option<String>,
}

#[derive(Template)]
#[template(path = "classes.html")]
pub struct ClassesPage {
    pub classes: Vec<Class>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Shared by the add and edit forms: class_id is None when adding.
#[derive(Template)]
#[template(path = "add_edit_class.html")]
pub struct ClassFormPage {
    pub class_id: Option<i64>,
    pub name: String,
    pub teacher_name: String,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "students.html")]
pub struct StudentsPage {
    pub students: Vec<StudentWithClass>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "add_edit_student.html")]
pub struct StudentFormPage<'a> {
    pub student_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub class_id: Option<i64>,
    pub classes: &'a [Class],
    pub error_message: Option<String>,
}

impl<'a> StudentFormPage<'a> {
    pub fn is_assigned_to(&self, class: &Class) -> bool {
        self.class_id == Some(class.id)
    }
}

/// The loaded half of the take-attendance page: the roster grid for the
/// selected class and date.
pub struct RosterView<'a> {
    pub class_id: i64,
    pub class_name: String,
    pub date: String,
    pub entries: &'a [RosterEntry],
}

#[derive(Template)]
#[template(path = "take_attendance.html")]
pub struct TakeAttendancePage<'a> {
    pub classes: &'a [Class],
    // Pre-filled value for the selection form's date input.
    pub default_date: String,
    pub roster: Option<RosterView<'a>>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,
}

impl<'a> TakeAttendancePage<'a> {
    pub fn is_selected(&self, class: &Class) -> bool {
        match &self.roster {
            Some(r) => r.class_id == class.id,
            None => false,
        }
    }
}

#[derive(Template)]
#[template(path = "view_attendance.html")]
pub struct ViewAttendancePage<'a> {
    pub classes: &'a [Class],
    pub records: &'a [AttendanceViewRow],
    // Distinguishes "no records found" from "filters not yet submitted".
    pub searched: bool,
    pub filter_class_id: Option<i64>,
    pub filter_date: String,
    pub info_message: Option<String>,
}

impl<'a> ViewAttendancePage<'a> {
    pub fn is_filtered_by(&self, class: &Class) -> bool {
        self.filter_class_id == Some(class.id)
    }
}
