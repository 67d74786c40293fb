//! Prompt templates for menu generation and progress evaluation, plus the
//! best-effort dish-name extraction used for duplicate avoidance. All
//! functions are pure: the same inputs always produce byte-identical text,
//! which is what makes this layer testable even though the model behind it
//! is not.

use time::Date;

use crate::{
    auth::repo::User,
    dates,
    menu::repo::DailyMenu,
    metrics::MetricSummary,
};

/// Profile snapshot with the display fallbacks already applied.
#[derive(Debug, Clone)]
pub struct PromptProfile {
    pub gender: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    pub goal: String,
    pub activity: String,
    pub allergies: String,
}

impl PromptProfile {
    pub fn from_user(user: &User) -> Self {
        fn or_unknown<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "không rõ".to_string())
        }
        fn or_default(value: &Option<String>, fallback: &str) -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v.clone(),
                _ => fallback.to_string(),
            }
        }

        Self {
            gender: or_default(&user.gender, "không rõ"),
            age: or_unknown(&user.age),
            height: or_unknown(&user.height),
            weight: or_unknown(&user.weight),
            goal: or_default(&user.dietary_goal, "Duy trì sức khỏe"),
            activity: or_default(&user.activity_level, "Vận động vừa"),
            allergies: or_default(&user.allergies, "Không có"),
        }
    }
}

fn guidance_line(summary: Option<&MetricSummary>) -> String {
    match summary {
        Some(s) => format!(
            "\n- Calo khuyến nghị: {} kcal/ngày ({})",
            s.target_calories,
            s.goal.guidance_label()
        ),
        None => String::new(),
    }
}

/// The "do not repeat" block: dish names grouped by date, newest first.
fn exclusion_block(exclusions: &[(Date, Vec<String>)]) -> String {
    let mut dated: Vec<String> = Vec::new();
    for (date, dishes) in exclusions {
        if dishes.is_empty() {
            continue;
        }
        dated.push(format!(
            "  Ngày {}: {}\n",
            dates::dd_mm(*date),
            dishes.join(", ")
        ));
    }
    if dated.is_empty() {
        return String::new();
    }

    let mut block = String::from(
        "\n\n🚫 TUYỆT ĐỐI KHÔNG LẶP LẠI CÁC MÓN SAU (đã dùng trong 3 ngày gần đây):\n",
    );
    for line in dated {
        block.push_str(&line);
    }
    block.push_str(
        "\n⚡ BẮT BUỘC: Thực đơn hôm nay phải có món ăn HOÀN TOÀN KHÁC, sáng tạo và đa dạng!\n",
    );
    block
}

/// Generation request for one day. `day_number` and a non-empty exclusion
/// list switch on the stronger variety wording used inside multi-day
/// batches.
pub fn daily_prompt(
    profile: &PromptProfile,
    date: Date,
    day_number: Option<usize>,
    summary: Option<&MetricSummary>,
    exclusions: &[(Date, Vec<String>)],
) -> String {
    let header = match day_number {
        Some(n) => format!(
            "🍽️ NHIỆM VỤ: Tạo thực đơn dinh dưỡng cho ngày {} (Ngày thứ {})\n\n",
            dates::dd_mm_yyyy(date),
            n
        ),
        None => format!(
            "🍽️ NHIỆM VỤ: Tạo thực đơn dinh dưỡng cho ngày {}\n\n",
            dates::dd_mm_yyyy(date)
        ),
    };

    let batch_mode = day_number.is_some();
    let variety = if batch_mode {
        "5. Món ăn ĐA DẠNG, sáng tạo, phù hợp văn hóa ẩm thực Việt Nam\n"
    } else {
        "5. Món ăn đa dạng, phù hợp văn hóa ẩm thực Việt Nam\n"
    };
    let extra_requirements = if batch_mode {
        "7. Thay đổi cách chế biến: luân phiên chiên, xào, hấp, luộc, nướng, kho\n\
         8. Đa dạng nguồn protein: thịt bò, thịt lợn, gà, cá, trứng, đậu phụ\n"
    } else {
        ""
    };
    let creativity_note = if batch_mode {
        "- HÃY SÁNG TẠO - thực đơn này phải ĐẶC BIỆT và KHÁC BIỆT!\n"
    } else {
        ""
    };

    format!(
        "{header}\
         📊 THÔNG TIN NGƯỜI DÙNG:\n\
         - Giới tính: {gender}\n\
         - Tuổi: {age} tuổi\n\
         - Chiều cao: {height} cm\n\
         - Cân nặng: {weight} kg\n\
         - Mục tiêu sức khỏe: {goal}\n\
         - Mức độ hoạt động: {activity}\n\
         - Dị ứng/Hạn chế: {allergies}{guidance}{exclusions}\n\n\
         🎯 YÊU CẦU THỰC ĐƠN:\n\
         1. Tạo 3 bữa ăn chính: Bữa sáng, Bữa trưa, Bữa tối\n\
         2. Mỗi món ăn phải ghi:\n   \
         - Tên món ăn (món Việt Nam ưu tiên)\n   \
         - Khẩu phần cụ thể (gram/ml)\n   \
         - Calo ước tính cho từng món\n\
         3. Cuối cùng tính TỔNG CALO cả ngày\n\
         4. Thực đơn cân đối dinh dưỡng: đủ protein, tinh bột, chất béo, rau củ\n\
         {variety}\
         6. TUYỆT ĐỐI tránh các món có: {allergies}\n\
         {extra_requirements}\n\
         📝 FORMAT TRẢ LỜI (BẮT BUỘC):\n\
         Bữa sáng 🌅\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\n\
         Bữa trưa 🌞\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\n\
         Bữa tối 🌙\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\
         - [Tên món] ([gram/ml]) - [calo] kcal\n\n\
         Tổng calo: [số] kcal\n\n\
         ⚠️ LƯU Ý:\n\
         - KHÔNG hỏi thêm thông tin\n\
         - KHÔNG đưa lời khuyên hay giải thích thêm\n\
         - CHỈ trả về thực đơn theo đúng format trên\n\
         - Dùng emoji phù hợp cho mỗi bữa ăn\n\
         {creativity_note}",
        header = header,
        gender = profile.gender,
        age = profile.age,
        height = profile.height,
        weight = profile.weight,
        goal = profile.goal,
        activity = profile.activity,
        allergies = profile.allergies,
        guidance = guidance_line(summary),
        exclusions = exclusion_block(exclusions),
        variety = variety,
        extra_requirements = extra_requirements,
        creativity_note = creativity_note,
    )
}

/// Compact expert prompt used by the fixed 7-day batch (no dedup pass).
pub fn weekly_prompt(profile: &PromptProfile, date: Date) -> String {
    format!(
        "Bạn là chuyên gia dinh dưỡng. Hãy tạo thực đơn ăn uống cho 1 ngày ({}) dựa trên thông tin sau:\n\
         - Giới tính: {}\n\
         - Tuổi: {}\n\
         - Chiều cao: {}cm\n\
         - Cân nặng: {}kg\n\
         - Mục tiêu: {}\n\
         - Mức độ vận động: {}\n\
         - Dị ứng/Không ăn được: {}\n\n\
         YÊU CẦU:\n\
         1. Chỉ trả về thực đơn 3 bữa: Sáng, Trưa, Tối\n\
         2. Mỗi bữa ghi rõ: tên món ăn, khẩu phần (gram), calo ước tính\n\
         3. Cuối cùng ghi tổng calo cả ngày\n\
         4. Đa dạng món ăn, không lặp lại\n\
         5. Trả lời ngắn gọn, có emoji\n",
        dates::dd_mm_yyyy(date),
        profile.gender,
        profile.age,
        profile.height,
        profile.weight,
        profile.goal,
        profile.activity,
        profile.allergies,
    )
}

/// Evaluation request for the weight-progress endpoint; the numeric summary
/// travels alongside, this text only feeds the model.
#[allow(clippy::too_many_arguments)]
pub fn evaluation_prompt(
    goal: &str,
    days: i64,
    start_weight: f64,
    current_weight: f64,
    change: f64,
    change_percent: f64,
    avg_per_week: f64,
    volatility: f64,
    trend_label: &str,
) -> String {
    format!(
        "Bạn là chuyên gia dinh dưỡng. Hãy đánh giá tiến trình cân nặng {days} ngày qua của người dùng:\n\
         - Mục tiêu: {goal}\n\
         - Cân nặng bắt đầu: {start_weight} kg\n\
         - Cân nặng hiện tại: {current_weight} kg\n\
         - Thay đổi: {change} kg ({change_percent}%)\n\
         - Trung bình mỗi tuần: {avg_per_week} kg\n\
         - Dao động (max - min): {volatility} kg\n\
         - Xu hướng so với mục tiêu: {trend_label}\n\n\
         YÊU CẦU:\n\
         1. Nhận xét ngắn gọn tiến trình so với mục tiêu\n\
         2. Đưa ra 2-3 gợi ý cụ thể cho giai đoạn tiếp theo\n\
         3. Trả lời thân thiện, tối đa 150 từ, có emoji\n"
    )
}

/// Pulls dish names out of stored menu text: bullet lines that carry the
/// kcal token, name taken up to the first parenthesis. Lines that do not
/// match are skipped, never an error — the content is unstructured model
/// output.
pub fn extract_dish_names(content: &str) -> Vec<String> {
    let mut dishes = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('-') || !trimmed.to_lowercase().contains("kcal") {
            continue;
        }
        let name = trimmed
            .split('(')
            .next()
            .unwrap_or("")
            .replace('-', "")
            .trim()
            .to_string();
        if name.chars().count() > 3 {
            dishes.push(name);
        }
    }
    dishes
}

/// Maps recent menus (already ordered newest first) to their extracted dish
/// lists for the exclusion block.
pub fn recent_exclusions(menus: &[DailyMenu]) -> Vec<(Date, Vec<String>)> {
    menus
        .iter()
        .map(|menu| (menu.date, extract_dish_names(&menu.content)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn profile() -> PromptProfile {
        PromptProfile {
            gender: "nam".into(),
            age: "30".into(),
            height: "175".into(),
            weight: "70".into(),
            goal: "Giảm cân".into(),
            activity: "Vận động vừa".into(),
            allergies: "Không có".into(),
        }
    }

    #[test]
    fn extraction_keeps_bullet_kcal_lines_only() {
        let content = "Bữa sáng 🌅\n- Phở bò (300g) - 350 kcal\n";
        assert_eq!(extract_dish_names(content), vec!["Phở bò".to_string()]);
    }

    #[test]
    fn extraction_ignores_short_names_and_malformed_lines() {
        let content = "- Gà (100g) - 200 kcal\n- Bún chả (1 suất) - 450 kcal\n\
                       Tổng calo: 650 kcal\n- không có ngoặc 300 kcal\n";
        let dishes = extract_dish_names(content);
        // "Gà" has only 2 characters, the total line has no bullet, and the
        // parenthesis-free line still yields its leading text.
        assert_eq!(dishes, vec!["Bún chả".to_string(), "không có ngoặc 300 kcal".to_string()]);
    }

    #[test]
    fn extraction_of_empty_content_is_empty() {
        assert!(extract_dish_names("").is_empty());
        assert!(extract_dish_names("chỉ có chữ thường").is_empty());
    }

    #[test]
    fn daily_prompt_is_deterministic() {
        let d = date!(2025 - 06 - 01);
        let a = daily_prompt(&profile(), d, None, None, &[]);
        let b = daily_prompt(&profile(), d, None, None, &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn daily_prompt_embeds_date_and_profile() {
        let text = daily_prompt(&profile(), date!(2025 - 06 - 01), None, None, &[]);
        assert!(text.contains("ngày 01/06/2025"));
        assert!(text.contains("- Giới tính: nam"));
        assert!(text.contains("- Cân nặng: 70 kg"));
        assert!(!text.contains("Calo khuyến nghị"));
        assert!(!text.contains("KHÔNG LẶP LẠI"));
    }

    #[test]
    fn guidance_line_present_when_summary_given() {
        let summary = crate::metrics::summary(
            Some(70.0),
            Some(175.0),
            Some(30),
            Some("nam"),
            "Vận động vừa",
            "giảm cân",
        )
        .expect("summary computes");
        let text = daily_prompt(&profile(), date!(2025 - 06 - 01), None, Some(&summary), &[]);
        assert!(text.contains("- Calo khuyến nghị: 2172 kcal/ngày (giảm cân an toàn)"));
    }

    #[test]
    fn exclusion_block_lists_dishes_by_date() {
        let exclusions = vec![
            (date!(2025 - 05 - 31), vec!["Phở bò".to_string(), "Bún chả".to_string()]),
            (date!(2025 - 05 - 30), vec![]),
        ];
        let text = daily_prompt(
            &profile(),
            date!(2025 - 06 - 01),
            Some(2),
            None,
            &exclusions,
        );
        assert!(text.contains("(Ngày thứ 2)"));
        assert!(text.contains("Ngày 31/05: Phở bò, Bún chả"));
        // dateless empty entry contributes nothing
        assert!(!text.contains("Ngày 30/05"));
        assert!(text.contains("HOÀN TOÀN KHÁC"));
        assert!(text.contains("7. Thay đổi cách chế biến"));
    }

    #[test]
    fn exclusion_block_omitted_when_all_lists_empty() {
        let exclusions = vec![(date!(2025 - 05 - 31), vec![])];
        let text = daily_prompt(&profile(), date!(2025 - 06 - 01), Some(1), None, &exclusions);
        assert!(!text.contains("KHÔNG LẶP LẠI"));
    }

    #[test]
    fn weekly_prompt_mentions_every_field() {
        let text = weekly_prompt(&profile(), date!(2025 - 06 - 03));
        assert!(text.contains("03/06/2025"));
        assert!(text.contains("Chiều cao: 175cm"));
        assert!(text.contains("Mục tiêu: Giảm cân"));
    }

    #[test]
    fn evaluation_prompt_embeds_figures() {
        let text = evaluation_prompt("Giảm cân", 30, 72.0, 70.5, -1.5, -2.1, -0.35, 1.8, "đúng hướng");
        assert!(text.contains("30 ngày"));
        assert!(text.contains("-1.5 kg (-2.1%)"));
        assert!(text.contains("đúng hướng"));
    }
}
