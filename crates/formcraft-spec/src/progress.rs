use crate::answers::AnswerMap;
use crate::spec::FormSpec;

/// Answered/total counters over every field of a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub answered: usize,
    pub total: usize,
    pub required_answered: usize,
    pub required_total: usize,
}

impl ProgressCounts {
    pub fn compute(form: &FormSpec, answers: &AnswerMap) -> Self {
        let mut counts = Self::default();
        for (key, field) in form.answer_fields() {
            let answered = answers.is_answered(&key);
            counts.total += 1;
            counts.answered += usize::from(answered);
            if field.is_required {
                counts.required_total += 1;
                counts.required_answered += usize::from(answered);
            }
        }
        counts
    }

    /// Every required field holds a non-empty answer.
    pub fn is_complete(&self) -> bool {
        self.required_answered == self.required_total
    }
}
