//! Button labels, keyboards and fixed message texts.

use dialogue_flow::{InlineButton, KeyboardLayout, Reply};

pub const DOCTORS_LABEL: &str = "Врачи 👩🏻‍⚕️";
pub const ANALYSES_LABEL: &str = "Исследования 🔬";
pub const QUESTION_LABEL: &str = "Задать вопрос 🙋🏻";
pub const ABOUT_LABEL: &str = "О поликлинике 📄";
pub const BACK_LABEL: &str = "Назад";
pub const CONFIRM_LABEL: &str = "Подтвердить запись ✅";

/// Categories answered straight from the certificates endpoint, without a search term
pub const CERTIFICATE_CATEGORIES: [&str; 2] = ["справки (бассейн)", "справки (абитуриентам)"];

pub const START_COMMAND: &str = "start";

/// Unrecognized inputs tolerated before pointing the user to the call center
pub const MISS_THRESHOLD: u32 = 3;

/// Answer the FAQ endpoint gives when it has nothing
pub const FAQ_NOT_FOUND: &str = "Не найдено!";

const CALL_CENTER: &str = "Номер колл-центра: 8(3022)73-70-73";

pub const CHOOSE_ACTION: &str = "Выберите действие:";
pub const GOING_BACK: &str = "Возвращаюсь назад...";
pub const NO_PREVIOUS_MENU: &str = "Нет предыдущего меню.";
pub const CHOOSE_CATEGORY: &str = "Выберите категорию исследования:";
pub const CATEGORIES_EMPTY: &str = "Категории исследований пока недоступны.";
pub const CATEGORIES_FAILED: &str = "Не удалось загрузить категории исследований. Попробуйте позже.";
pub const INFO_FAILED: &str = "Не удалось получить информацию о поликлинике. Попробуйте позже.";

pub const ASK_DOCTOR: &str = "Напишите врача, к которому хотите записаться:";
pub const INVALID_DOCTOR: &str = "Введите корректное название специальности.";
pub const SEARCHING_DOCTORS: &str = "Ищем врачей... ⏳";
pub const DOCTOR_UNAVAILABLE: &str = "Ошибка. Данный врач сейчас не доступен";
pub const DOCTORS_NOT_FOUND: &str = "Врачи с такой специализацией не найдены.";
pub const DOCTORS_FOUND: &str = "Вот список доступных врачей:";
pub const CONFIRM_QUESTION: &str = "Подтвердить запись?";

pub const ASK_SEARCH_TERM: &str = "📝 Введите название услуги или ключевые слова для поиска:";
pub const PICK_CATEGORY_FIRST: &str = "Сначала выберите категорию исследования из списка выше.";
pub const ANALYSIS_NOT_FOUND: &str =
    "Данного исследования не найдено или он находится в другой категории";

pub const ASK_QUESTION: &str = "Тут вы можете задать вопрос в свободной форме, и я постараюсь на него ответить! \nНапример: (Подготовка к сдаче крови и др.)";
pub const INVALID_QUESTION: &str = "Введите корректный вопрос";
pub const QUESTION_NOT_FOUND: &str = "Вопрос не найден!";
pub const FAQ_FAILED: &str = "Сервис ответов временно недоступен. Попробуйте позже.";

/// Inline button pressed while a typed answer is expected
pub const STALE_BUTTON: &str = "Эта кнопка сейчас недоступна. Ответьте на вопрос выше или отправьте /start.";

pub const VOICE_DOWNLOAD_FAILED: &str = "Ошибка загрузки голосового сообщения!";
pub const VOICE_PROCESSING_FAILED: &str = "Не удалось обработать голосовое сообщение.";
pub const VOICE_BACKEND_FAILED: &str = "Ошибка обработки голосового сообщения. Попробуйте позже.";

/// Reply-keyboard buttons the idle dialogue understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Doctors,
    Analyses,
    Question,
    About,
    Back,
    Confirm,
    /// A certificate category typed as text; accepted but does nothing
    Certificate,
}

impl MenuCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let command = match text {
            DOCTORS_LABEL => MenuCommand::Doctors,
            ANALYSES_LABEL => MenuCommand::Analyses,
            QUESTION_LABEL => MenuCommand::Question,
            ABOUT_LABEL => MenuCommand::About,
            BACK_LABEL => MenuCommand::Back,
            CONFIRM_LABEL => MenuCommand::Confirm,
            _ if is_certificate_category(text) => MenuCommand::Certificate,
            _ => return None,
        };
        Some(command)
    }
}

pub fn is_certificate_category(category: &str) -> bool {
    CERTIFICATE_CATEGORIES.contains(&category)
}

fn layout(rows: &[&[&str]]) -> KeyboardLayout {
    rows.iter()
        .map(|row| row.iter().map(|label| label.to_string()).collect())
        .collect()
}

pub fn main_menu() -> KeyboardLayout {
    layout(&[
        &[DOCTORS_LABEL, ANALYSES_LABEL],
        &[QUESTION_LABEL],
        &[ABOUT_LABEL],
    ])
}

pub fn confirm_menu() -> KeyboardLayout {
    layout(&[&[CONFIRM_LABEL], &[BACK_LABEL]])
}

/// One inline button per category; the button data is the category itself
pub fn category_buttons(categories: &[String]) -> Vec<Vec<InlineButton>> {
    categories
        .iter()
        .map(|category| vec![InlineButton::new(category.clone(), category.clone())])
        .collect()
}

pub fn main_menu_reply() -> Reply {
    Reply::text(CHOOSE_ACTION).with_keyboard(main_menu())
}

pub fn referral_message() -> String {
    format!("Для продолжения записи обратитесь в колл-центр \n{CALL_CENTER}")
}

pub fn fallback_message() -> String {
    format!("Я не могу помочь вам с этим вопросом \n{CALL_CENTER}")
}

pub fn category_chosen_message(category: &str) -> String {
    format!("🔍 Вы выбрали категорию: {category}\n{ASK_SEARCH_TERM}")
}
