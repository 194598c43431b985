//! Registration form views and answer checks.

use chrono::Utc;
use mashar_models::lessons::{
    Answer, LessonForm, LessonFormView, LessonGroup, NEW_ENTITY_UID, Question,
};
use sqlx::types::Json;

use super::groups::group_name;
use crate::utils::dates::display_date;
use crate::utils::messages;

/// Blank form handed to the editor for uid `-1`.
pub fn empty_form(branch: &str) -> LessonForm {
    LessonForm {
        uid: NEW_ENTITY_UID.to_string(),
        branch: branch.to_string(),
        group: String::new(),
        active: false,
        date: Utc::now(),
        name: String::new(),
        title: String::new(),
        subtitle: String::new(),
        desc: String::new(),
        qa: Json(Vec::new()),
    }
}

pub fn form_view(form: LessonForm, branch_name: &str, groups: &[LessonGroup]) -> LessonFormView {
    LessonFormView {
        group_name: group_name(groups, &form.group),
        date: display_date(&form.date),
        branch: branch_name.to_string(),
        branch_code: form.branch,
        uid: form.uid,
        name: form.name,
        active: form.active,
        group: form.group,
        title: form.title,
        subtitle: form.subtitle,
        desc: form.desc,
        qa: form.qa.0,
    }
}

/// Checks `answers` against the form's questions and returns them in question
/// order with the question text filled in. Answers to unknown questions are
/// dropped.
pub fn check_answers(qa: &[Question], answers: &[Answer]) -> Result<Vec<Answer>, String> {
    let mut checked = Vec::with_capacity(qa.len());

    for question in qa {
        let answer = answers
            .iter()
            .find(|a| a.qid == question.qid)
            .map(|a| a.answer.trim())
            .unwrap_or_default();

        if answer.is_empty() {
            if question.validation.required {
                return Err(messages::FORM_FILL_ALL.to_string());
            }
            continue;
        }

        if let Some(min) = question.validation.minlength
            && answer.chars().count() < min
        {
            return Err(format!("'{}' {} {min}", question.q, messages::ANSWER_TOO_SHORT));
        }

        checked.push(Answer {
            qid: question.qid.clone(),
            answer: answer.to_string(),
            question: question.q.clone(),
        });
    }

    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mashar_models::lessons::{QuestionType, QuestionValidation};

    fn question(qid: &str, required: bool, minlength: Option<usize>) -> Question {
        Question {
            qid: qid.to_string(),
            q: format!("Question {qid}"),
            kind: QuestionType::Text,
            options: vec![],
            validation: QuestionValidation {
                required,
                minlength,
            },
        }
    }

    fn answer(qid: &str, text: &str) -> Answer {
        Answer {
            qid: qid.to_string(),
            answer: text.to_string(),
            question: String::new(),
        }
    }

    #[test]
    fn test_answers_get_question_text() {
        let qa = vec![question("name", true, None), question("phone", false, None)];
        let checked = check_answers(&qa, &[answer("phone", "050"), answer("name", " Noa ")]).unwrap();
        assert_eq!(checked.len(), 2);
        assert_eq!(checked[0].qid, "name");
        assert_eq!(checked[0].answer, "Noa");
        assert_eq!(checked[0].question, "Question name");
    }

    #[test]
    fn test_missing_required_answer() {
        let qa = vec![question("name", true, None)];
        assert_eq!(
            check_answers(&qa, &[answer("name", "   ")]).unwrap_err(),
            messages::FORM_FILL_ALL
        );
        assert!(check_answers(&qa, &[]).is_err());
    }

    #[test]
    fn test_optional_answer_may_be_skipped() {
        let qa = vec![question("notes", false, Some(10))];
        assert!(check_answers(&qa, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_minlength_counts_characters() {
        let qa = vec![question("id", true, Some(3))];
        assert!(check_answers(&qa, &[answer("id", "ab")]).is_err());
        assert!(check_answers(&qa, &[answer("id", "אבג")]).is_ok());
    }

    #[test]
    fn test_unknown_answers_are_dropped() {
        let qa = vec![question("name", false, None)];
        let checked = check_answers(&qa, &[answer("other", "x")]).unwrap();
        assert!(checked.is_empty());
    }

    #[test]
    fn test_form_view() {
        let mut form = empty_form("ksv");
        form.group = "g1".to_string();
        let groups = vec![LessonGroup {
            gid: "g1".to_string(),
            name: "Robotics".to_string(),
            grade: String::new(),
            active: true,
        }];

        let view = form_view(form, "Kfar Saba", &groups);
        assert_eq!(view.branch_code, "ksv");
        assert_eq!(view.branch, "Kfar Saba");
        assert_eq!(view.group_name.as_deref(), Some("Robotics"));
        assert_eq!(view.uid, NEW_ENTITY_UID);
        assert_eq!(view.date.len(), 10);
    }
}
