//! The state of the user interface (selected tab, open modal, form fields...)
//!
//! This state is never mutated in place: [`reduce`] builds the next state from the current one and a [`ViewAction`].

use chrono::NaiveDate;

use crate::task::TaskId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Home,
    Calendar,
    Profile,
}

impl Default for Tab {
    fn default() -> Self {
        Tab::Home
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Modal {
    None,
    /// The "new task" form
    AddTask,
    /// The date picker, to set the deadline of a task
    DeadlinePicker(TaskId),
}

impl Default for Modal {
    fn default() -> Self {
        Modal::None
    }
}

/// The fields of the "new task" form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

impl TaskForm {
    /// Whether this form can be submitted
    pub fn is_valid(&self) -> bool {
        self.title.trim().is_empty() == false
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    pub tab: Tab,
    pub modal: Modal,
    pub form: TaskForm,
    /// The day selected in the calendar
    pub selected_date: Option<NaiveDate>,
    /// An error to display to the user
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewAction {
    SelectTab(Tab),
    OpenAddTask,
    OpenDeadlinePicker(TaskId),
    CloseModal,
    EditTitle(String),
    EditDescription(String),
    SelectDate(NaiveDate),
    ShowError(String),
    DismissError,
    /// The form has been sent to the task store
    SubmitTask,
}

/// Returns the state that follows `state` after `action`
pub fn reduce(state: &ViewState, action: ViewAction) -> ViewState {
    let mut next = state.clone();
    match action {
        ViewAction::SelectTab(tab) => {
            next.tab = tab;
            next.modal = Modal::None;
        },
        ViewAction::OpenAddTask => {
            next.modal = Modal::AddTask;
            next.form = TaskForm::default();
        },
        ViewAction::OpenDeadlinePicker(task_id) => {
            next.modal = Modal::DeadlinePicker(task_id);
        },
        ViewAction::CloseModal => {
            next.modal = Modal::None;
        },
        ViewAction::EditTitle(title) => next.form.title = title,
        ViewAction::EditDescription(description) => next.form.description = description,
        ViewAction::SelectDate(date) => next.selected_date = Some(date),
        ViewAction::ShowError(message) => next.error = Some(message),
        ViewAction::DismissError => next.error = None,
        ViewAction::SubmitTask => {
            if next.form.is_valid() {
                next.modal = Modal::None;
                next.form = TaskForm::default();
                next.error = None;
            } else {
                next.error = Some("A task needs a title".to_string());
            }
        },
    }
    next
}
