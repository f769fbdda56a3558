//! Per-row action menus.

use std::fmt;
use std::rc::Rc;

/// Visual treatment of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionVariant {
    #[default]
    Default,
    /// Irreversible operations such as delete
    Destructive,
}

type RowHandler<T> = Rc<dyn Fn(&T)>;
type RowCheck<T> = Rc<dyn Fn(&T) -> bool>;

/// An operation offered in a row's action menu.
pub struct RowAction<T> {
    pub label: String,
    pub variant: ActionVariant,
    on_click: RowHandler<T>,
    disabled: Option<RowCheck<T>>,
    hidden: Option<RowCheck<T>>,
}

impl<T> Clone for RowAction<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            variant: self.variant,
            on_click: Rc::clone(&self.on_click),
            disabled: self.disabled.clone(),
            hidden: self.hidden.clone(),
        }
    }
}

impl<T> fmt::Debug for RowAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("label", &self.label)
            .field("variant", &self.variant)
            .field("disabled", &self.disabled.is_some())
            .field("hidden", &self.hidden.is_some())
            .finish()
    }
}

impl<T> RowAction<T> {
    /// Create an action with a click handler.
    pub fn new(label: impl Into<String>, on_click: impl Fn(&T) + 'static) -> Self {
        Self {
            label: label.into(),
            variant: ActionVariant::Default,
            on_click: Rc::new(on_click),
            disabled: None,
            hidden: None,
        }
    }

    /// Mark the action as destructive.
    pub fn destructive(mut self) -> Self {
        self.variant = ActionVariant::Destructive;
        self
    }

    /// Render the item inert for rows matching the predicate.
    pub fn disabled_when(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.disabled = Some(Rc::new(f));
        self
    }

    /// Leave the item out for rows matching the predicate.
    pub fn hidden_when(mut self, f: impl Fn(&T) -> bool + 'static) -> Self {
        self.hidden = Some(Rc::new(f));
        self
    }

    pub fn is_disabled(&self, row: &T) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(row))
    }

    pub fn is_hidden(&self, row: &T) -> bool {
        self.hidden.as_ref().is_some_and(|f| f(row))
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == ActionVariant::Destructive
    }

    /// Invoke the click handler.
    pub fn trigger(&self, row: &T) {
        (self.on_click)(row);
    }
}

/// A visible menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Index into the action list the menu was built from
    pub action_index: usize,
    pub label: String,
    pub disabled: bool,
    pub destructive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item(MenuItem),
    Separator,
}

/// The action menu for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMenu {
    pub entries: Vec<MenuEntry>,
}

impl ActionMenu {
    /// Visible items, skipping separators.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.entries.iter().filter_map(|entry| match entry {
            MenuEntry::Item(item) => Some(item),
            MenuEntry::Separator => None,
        })
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// The `n`th visible item.
    pub fn item(&self, n: usize) -> Option<&MenuItem> {
        self.items().nth(n)
    }

    /// Run the `n`th item's action on `row`. Disabled items do nothing.
    ///
    /// Returns whether an action ran.
    pub fn activate<T>(&self, n: usize, actions: &[RowAction<T>], row: &T) -> bool {
        let Some(item) = self.item(n) else {
            return false;
        };
        if item.disabled {
            return false;
        }
        match actions.get(item.action_index) {
            Some(action) => {
                tracing::debug!(action = %action.label, "row action triggered");
                action.trigger(row);
                true
            }
            None => false,
        }
    }
}

/// Build the menu for `row`, or `None` if every action is hidden.
///
/// A separator follows each destructive item that is not the last visible
/// item.
pub fn build_action_menu<T>(actions: &[RowAction<T>], row: &T) -> Option<ActionMenu> {
    let visible: Vec<(usize, &RowAction<T>)> = actions
        .iter()
        .enumerate()
        .filter(|(_, action)| !action.is_hidden(row))
        .collect();

    if visible.is_empty() {
        return None;
    }

    let last = visible.len() - 1;
    let mut entries = Vec::with_capacity(visible.len() + 1);
    for (pos, (index, action)) in visible.into_iter().enumerate() {
        let destructive = action.is_destructive();
        entries.push(MenuEntry::Item(MenuItem {
            action_index: index,
            label: action.label.clone(),
            disabled: action.is_disabled(row),
            destructive,
        }));
        if destructive && pos != last {
            entries.push(MenuEntry::Separator);
        }
    }

    Some(ActionMenu { entries })
}
