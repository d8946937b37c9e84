//! Dialog policy: which behavior script drives the reply for a category.
//!
//! Selection is a pure lookup on the freshly classified category. The
//! assessed urgency is attached afterwards so the rendered prompt can point
//! the model at the matching triage branch; it never changes which script
//! is chosen.

use serde::{Deserialize, Serialize};

use super::{Category, UrgencyLevel};

/// Sentence every emergency reply must open with.
pub const EMERGENCY_DISCLAIMER: &str = "This is a preliminary assessment based on your words; \
it may be inaccurate. Take your pet to the clinic urgently!";

const PERSONA: &str = "You are a friendly veterinary assistant working at the front desk of a \
pet clinic. You talk to pet owners in plain, warm language.";

const FORMATTING_RULES: [&str; 6] = [
    "Write plain text only: no markdown, no asterisks, no headings, no bullet symbols.",
    "Keep a friendly, calm tone.",
    "Use short paragraphs.",
    "Never leave more than one empty line between paragraphs.",
    "Ask exactly one question per message.",
    "Do not unload everything at once; move the conversation forward step by step.",
];

const CLOSING_RULE: &str = "If the owner says goodbye or says they are heading to the clinic, \
wish the pet a quick recovery, briefly summarize what was discussed and ask no further questions.";

/// Instruction for one urgency level within a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrgencyBranch {
    pub urgency: UrgencyLevel,
    pub instruction: String,
}

/// Instruction payload handed to reply generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorScript {
    category: Category,
    stance: String,
    branches: Vec<UrgencyBranch>,
    formatting_rules: Vec<String>,
    closing_rule: String,
    assessed_urgency: UrgencyLevel,
}

impl BehaviorScript {
    fn new(category: Category, stance: &str, branches: Vec<UrgencyBranch>) -> Self {
        Self {
            category,
            stance: stance.to_string(),
            branches,
            formatting_rules: FORMATTING_RULES.iter().map(|r| r.to_string()).collect(),
            closing_rule: CLOSING_RULE.to_string(),
            assessed_urgency: UrgencyLevel::Unset,
        }
    }

    /// Same script, annotated with the urgency assessed for this turn.
    pub fn with_assessed_urgency(mut self, urgency: UrgencyLevel) -> Self {
        self.assessed_urgency = urgency;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn stance(&self) -> &str {
        &self.stance
    }

    pub fn branches(&self) -> &[UrgencyBranch] {
        &self.branches
    }

    pub fn formatting_rules(&self) -> &[String] {
        &self.formatting_rules
    }

    pub fn closing_rule(&self) -> &str {
        &self.closing_rule
    }

    pub fn assessed_urgency(&self) -> UrgencyLevel {
        self.assessed_urgency
    }

    /// Branch instruction for an urgency level, if the script has one.
    pub fn branch_for(&self, urgency: UrgencyLevel) -> Option<&UrgencyBranch> {
        self.branches.iter().find(|b| b.urgency == urgency)
    }

    /// Renders the script as a system prompt.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(PERSONA);
        prompt.push_str("\n\n");
        prompt.push_str(&self.stance);
        prompt.push('\n');

        if !self.branches.is_empty() {
            prompt.push_str("\nDepending on urgency:\n");
            for branch in &self.branches {
                prompt.push_str(&format!(
                    "- If urgency is {}: {}\n",
                    branch.urgency.as_str(),
                    branch.instruction
                ));
            }
        }

        if self.assessed_urgency != UrgencyLevel::Unset {
            prompt.push_str(&format!(
                "\nAssessed urgency for this message: {}.\n",
                self.assessed_urgency.as_str()
            ));
        }

        prompt.push_str("\nFormatting rules:\n");
        for rule in &self.formatting_rules {
            prompt.push_str("- ");
            prompt.push_str(rule);
            prompt.push('\n');
        }

        prompt.push('\n');
        prompt.push_str(&self.closing_rule);
        prompt
    }
}

/// Selects the behavior script for a category.
pub fn select_script(category: Category) -> BehaviorScript {
    match category {
        Category::Intake => BehaviorScript::new(
            category,
            "Greet the owner and fill in the patient card. Ask for the pet's name, breed, age \
             and weight, one question at a time, skipping anything already known.",
            Vec::new(),
        ),
        Category::Triage => BehaviorScript::new(
            category,
            "The owner describes a health problem. Assess it carefully and guide them according \
             to the urgency.",
            vec![
                UrgencyBranch {
                    urgency: UrgencyLevel::Emergency,
                    instruction: format!(
                        "Warn about the high risk and give a preliminary conclusion. You must \
                         start with the sentence: \"{}\"",
                        EMERGENCY_DISCLAIMER
                    ),
                },
                UrgencyBranch {
                    urgency: UrgencyLevel::NeedsVisit,
                    instruction: "Explain why a visit to the vet is necessary and how to prepare \
                                  for it."
                        .to_string(),
                },
                UrgencyBranch {
                    urgency: UrgencyLevel::Stable,
                    instruction: "Give guidance on observing the pet at home.".to_string(),
                },
            ],
        ),
        Category::Consultation => BehaviorScript::new(
            category,
            "The owner asks about care, feeding or behavior. First clarify the context, then give \
             practical care advice.",
            Vec::new(),
        ),
        Category::Protection => BehaviorScript::new(
            category,
            "The request is not about the pet's health or care. Politely decline and offer to \
             help with the pet instead.",
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_a_script() {
        for category in Category::ALL {
            let script = select_script(category);
            assert_eq!(script.category(), category);
            assert!(!script.stance().is_empty());
            assert_eq!(script.formatting_rules().len(), FORMATTING_RULES.len());
        }
    }

    #[test]
    fn only_triage_has_urgency_branches() {
        assert_eq!(select_script(Category::Triage).branches().len(), 3);
        assert!(select_script(Category::Intake).branches().is_empty());
        assert!(select_script(Category::Consultation).branches().is_empty());
        assert!(select_script(Category::Protection).branches().is_empty());
    }

    #[test]
    fn emergency_branch_leads_with_disclaimer() {
        let script = select_script(Category::Triage);
        let branch = script.branch_for(UrgencyLevel::Emergency).unwrap();
        assert!(branch.instruction.contains(EMERGENCY_DISCLAIMER));
    }

    #[test]
    fn selection_ignores_urgency() {
        let plain = select_script(Category::Consultation);
        let annotated = select_script(Category::Consultation)
            .with_assessed_urgency(UrgencyLevel::Emergency);
        assert_eq!(plain.stance(), annotated.stance());
        assert_eq!(plain.branches(), annotated.branches());
    }

    #[test]
    fn prompt_names_assessed_urgency() {
        let prompt = select_script(Category::Triage)
            .with_assessed_urgency(UrgencyLevel::NeedsVisit)
            .system_prompt();
        assert!(prompt.contains("Assessed urgency for this message: needs_visit."));
        assert!(prompt.contains("If urgency is emergency"));
    }

    #[test]
    fn prompt_omits_unset_urgency() {
        let prompt = select_script(Category::Intake).system_prompt();
        assert!(!prompt.contains("Assessed urgency"));
        assert!(prompt.contains("one question at a time"));
    }

    #[test]
    fn prompt_carries_formatting_and_closing_rules() {
        let prompt = select_script(Category::Protection).system_prompt();
        assert!(prompt.contains("no markdown"));
        assert!(prompt.contains("exactly one question"));
        assert!(prompt.contains("ask no further questions"));
    }
}
