//! Rendering of backend payloads into message text.

use serde_json::Value;

use crate::models::{AnalysisRecord, DoctorRecord, InfoRecord, ScheduleEntry};

/// Longest free-text field shown for an analysis, in characters
pub const DISPLAY_LIMIT: usize = 100;

/// Line marker for analyses found by search
pub const ANALYSIS_MARKER: &str = "🔬";
/// Line marker for certificate listings
pub const CERTIFICATE_MARKER: &str = "🧪";

/// First `limit` characters of `text`, cut exactly, without an ellipsis.
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn doctor_line(doctor: &DoctorRecord) -> String {
    format!(
        "👨‍⚕️ {} - {} ({}): {} руб.",
        doctor.specialization, doctor.academic_degree, doctor.type_visit, doctor.price
    )
}

pub fn format_doctors(doctors: &[DoctorRecord]) -> String {
    doctors.iter().map(doctor_line).collect::<Vec<_>>().join("\n")
}

pub fn analysis_line(analysis: &AnalysisRecord, marker: &str) -> String {
    format!(
        "{marker} - {} : {} руб.",
        truncate(&analysis.full_text, DISPLAY_LIMIT),
        analysis.price
    )
}

pub fn format_analyses(analyses: &[AnalysisRecord], marker: &str) -> String {
    analyses
        .iter()
        .map(|analysis| analysis_line(analysis, marker))
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_schedule(text: &mut String, schedule: &[ScheduleEntry]) {
    for entry in schedule {
        text.push_str(&format!("   📅 {}: {}\n", entry.days, entry.hours));
    }
}

/// Markdown clinic card: phone first, then every address with its schedules.
pub fn format_info(info: &InfoRecord) -> String {
    let mut text = String::from("📍 *Информация о поликлинике:*\n\n");

    if let Some(phone) = info.phone.as_deref().filter(|phone| !phone.is_empty()) {
        text.push_str(&format!("📞 *Телефон:* `{phone}`\n\n"));
    }

    for address in &info.addresses {
        text.push_str(&format!("🏥 *Адрес:* {}\n", address.address));
        text.push_str("🕒 *Диагностическая поликлиника:*\n");
        push_schedule(&mut text, &address.diagnostic_schedule);

        if let Some(lab) = address.lab_schedule.as_deref().filter(|lab| !lab.is_empty()) {
            text.push_str("🧪 *Бактериологическая лаборатория:*\n");
            push_schedule(&mut text, lab);
        }

        text.push('\n');
    }

    text
}

/// Text to show for a processed voice clip: the answer or transcript if present, the raw body otherwise.
pub fn format_audio_result(value: &Value) -> String {
    ["answer", "text"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}
