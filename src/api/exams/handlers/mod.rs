mod answers;
mod create;
mod list;
mod manage;

pub(super) use answers::{get_result, submit_answers};
pub(super) use create::create_exam;
pub(super) use list::{list_exam_answers, list_exams};
pub(super) use manage::{delete_exam, get_exam};
