use crate::sources::QaRow;

// Answers of the closed yes/no questions, not part of the multiclass task.
pub const BINARY_ANSWERS: [&str; 2] = ["yes", "no"];

pub fn is_binary(answer: &str) -> bool {
    BINARY_ANSWERS.contains(&answer)
}

/// Keep rows whose answer is not yes/no. Returns the kept rows and how many were dropped.
pub fn drop_binary(rows: Vec<QaRow>) -> (Vec<QaRow>, usize) {
    let total = rows.len();
    let kept: Vec<QaRow> = rows.into_iter().filter(|r| !is_binary(&r.answer)).collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_only_exact_yes_no() {
        let rows = vec![
            QaRow::new("1", "q1", "red"),
            QaRow::new("2", "q2", "yes"),
            QaRow::new("3", "q3", "no"),
            QaRow::new("4", "q4", "Yes"),
            QaRow::new("5", "q5", "nodule"),
        ];
        let (kept, dropped) = drop_binary(rows);
        assert_eq!(dropped, 2);
        let answers: Vec<&str> = kept.iter().map(|r| r.answer.as_str()).collect();
        assert_eq!(answers, vec!["red", "Yes", "nodule"]);
    }

    #[test]
    fn empty_input() {
        let (kept, dropped) = drop_binary(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(dropped, 0);
    }
}
