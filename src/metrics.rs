//! Calorie and body-metric arithmetic: BMR (Mifflin-St Jeor), TDEE, BMI and
//! weight-trend classification. Everything here is a pure function over a
//! profile snapshot; handlers decide what to do when inputs are missing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Other,
}

impl Gender {
    /// The stored label is free text; only the literal "nam" (any case)
    /// selects the male branch of the formula.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("nam") {
            Self::Male
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Exact label lookup; anything unrecognized falls back to Moderate.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Ít vận động" => Self::Sedentary,
            "Vận động nhẹ" => Self::Light,
            "Vận động vừa" => Self::Moderate,
            "Vận động nhiều" => Self::Active,
            "Vận động rất nhiều" => Self::VeryActive,
            _ => Self::Moderate,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Explicit goal type replacing the legacy scattered substring checks.
/// `from_text` is the single mapping from the stored free-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    LoseWeight,
    GainWeight,
    Maintain,
}

impl Goal {
    pub fn from_text(text: &str) -> Self {
        let t = text.to_lowercase();
        if t.contains("giảm cân") || t.contains("giảm béo") {
            Self::LoseWeight
        } else if t.contains("tăng cân") || t.contains("tăng cơ") {
            Self::GainWeight
        } else {
            Self::Maintain
        }
    }

    pub fn calorie_factor(self) -> f64 {
        match self {
            Self::LoseWeight => 0.85,
            Self::GainWeight => 1.15,
            Self::Maintain => 1.0,
        }
    }

    /// Suffix for the calorie-guidance line of the prompt.
    pub fn guidance_label(self) -> &'static str {
        match self {
            Self::LoseWeight => "giảm cân an toàn",
            Self::GainWeight => "tăng cân lành mạnh",
            Self::Maintain => "duy trì cân nặng",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricSummary {
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: i32,
    pub goal: Goal,
}

/// Mifflin-St Jeor basal metabolic rate.
pub fn bmr(weight_kg: f64, height_cm: f64, age_years: i32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Other => base - 161.0,
    }
}

/// Computes BMR/TDEE/target calories. Returns `None` unless weight, height,
/// age and gender are all present — callers then fall back to unguided
/// prompt generation.
pub fn summary(
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age_years: Option<i32>,
    gender: Option<&str>,
    activity_label: &str,
    goal_text: &str,
) -> Option<MetricSummary> {
    let (weight, height, age, gender) = (weight_kg?, height_cm?, age_years?, gender?);
    let bmr = bmr(weight, height, age, Gender::from_label(gender));
    let tdee = bmr * ActivityLevel::from_label(activity_label).multiplier();
    let goal = Goal::from_text(goal_text);
    let target_calories = (tdee * goal.calorie_factor()).floor() as i32;
    Some(MetricSummary {
        bmr,
        tdee,
        target_calories,
        goal,
    })
}

/// BMI rounded to one decimal. Guarded by presence and positive height so a
/// missing profile never turns into a division by zero.
pub fn bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let (weight, height) = (weight_kg?, height_cm?);
    if height <= 0.0 {
        return None;
    }
    let height_m = height / 100.0;
    Some(((weight / (height_m * height_m)) * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    OnTarget,
    SlowProgress,
    Stable,
    CounterToGoal,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Self::OnTarget => "đúng hướng",
            Self::SlowProgress => "tiến triển chậm",
            Self::Stable => "ổn định",
            Self::CounterToGoal => "ngược mục tiêu",
        }
    }
}

/// Classifies the average weekly weight change against the stated goal.
/// Thresholds: >= 0.3 kg/week toward the goal is on target, >= 0.05 is slow
/// progress, a drift of more than 0.1 kg/week away from it is counter.
pub fn classify_trend(goal: Goal, avg_kg_per_week: f64) -> Trend {
    let toward_goal = match goal {
        Goal::LoseWeight => -avg_kg_per_week,
        Goal::GainWeight => avg_kg_per_week,
        Goal::Maintain => {
            return if avg_kg_per_week.abs() <= 0.15 {
                Trend::Stable
            } else {
                Trend::CounterToGoal
            };
        }
    };
    if toward_goal >= 0.3 {
        Trend::OnTarget
    } else if toward_goal >= 0.05 {
        Trend::SlowProgress
    } else if toward_goal > -0.1 {
        Trend::Stable
    } else {
        Trend::CounterToGoal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_male_reference_case() {
        // 10*70 + 6.25*175 - 5*30 + 5
        let value = bmr(70.0, 175.0, 30, Gender::Male);
        assert!((value - 1648.75).abs() < 1e-9);
    }

    #[test]
    fn bmr_other_branch_subtracts_161() {
        let value = bmr(60.0, 165.0, 25, Gender::Other);
        assert!((value - (600.0 + 1031.25 - 125.0 - 161.0)).abs() < 1e-9);
    }

    #[test]
    fn gender_label_is_case_insensitive() {
        assert_eq!(Gender::from_label("Nam"), Gender::Male);
        assert_eq!(Gender::from_label("NAM"), Gender::Male);
        assert_eq!(Gender::from_label("nữ"), Gender::Other);
        assert_eq!(Gender::from_label(""), Gender::Other);
    }

    #[test]
    fn unknown_activity_defaults_to_moderate() {
        assert_eq!(ActivityLevel::from_label("gym 5 buổi"), ActivityLevel::Moderate);
        assert_eq!(
            ActivityLevel::from_label("Vận động rất nhiều").multiplier(),
            1.9
        );
    }

    #[test]
    fn loss_goal_target_is_floored() {
        let s = summary(
            Some(70.0),
            Some(175.0),
            Some(30),
            Some("nam"),
            "Vận động vừa",
            "Giảm cân trước Tết",
        )
        .expect("all inputs present");
        assert!((s.tdee - 2555.5625).abs() < 1e-9);
        assert_eq!(s.goal, Goal::LoseWeight);
        // 2555.5625 * 0.85 = 2172.228...
        assert_eq!(s.target_calories, 2172);
    }

    #[test]
    fn summary_requires_all_four_inputs() {
        assert!(summary(Some(70.0), None, Some(30), Some("nam"), "", "").is_none());
        assert!(summary(None, Some(175.0), Some(30), Some("nam"), "", "").is_none());
        assert!(summary(Some(70.0), Some(175.0), None, Some("nam"), "", "").is_none());
        assert!(summary(Some(70.0), Some(175.0), Some(30), None, "", "").is_none());
    }

    #[test]
    fn goal_classification_from_legacy_text() {
        assert_eq!(Goal::from_text("Muốn GIẢM CÂN nhanh"), Goal::LoseWeight);
        assert_eq!(Goal::from_text("tăng cơ giảm mỡ"), Goal::GainWeight);
        assert_eq!(Goal::from_text("Duy trì sức khỏe"), Goal::Maintain);
    }

    #[test]
    fn bmi_reference_case() {
        assert_eq!(bmi(Some(65.0), Some(170.0)), Some(22.5));
    }

    #[test]
    fn bmi_guards_missing_or_zero_height() {
        assert_eq!(bmi(Some(65.0), None), None);
        assert_eq!(bmi(None, Some(170.0)), None);
        assert_eq!(bmi(Some(65.0), Some(0.0)), None);
    }

    #[test]
    fn trend_classification_against_goal() {
        assert_eq!(classify_trend(Goal::LoseWeight, -0.5), Trend::OnTarget);
        assert_eq!(classify_trend(Goal::LoseWeight, -0.1), Trend::SlowProgress);
        assert_eq!(classify_trend(Goal::LoseWeight, 0.0), Trend::Stable);
        assert_eq!(classify_trend(Goal::LoseWeight, 0.4), Trend::CounterToGoal);
        assert_eq!(classify_trend(Goal::GainWeight, 0.4), Trend::OnTarget);
        assert_eq!(classify_trend(Goal::GainWeight, -0.4), Trend::CounterToGoal);
        assert_eq!(classify_trend(Goal::Maintain, 0.05), Trend::Stable);
        assert_eq!(classify_trend(Goal::Maintain, 0.5), Trend::CounterToGoal);
    }
}
