//! designer-side mutations of a form
//!
//! every change to fields or rules goes through here so that rule
//! validation, id allocation and display-order sequencing happen in one
//! place.

use std::collections::HashSet;

use tracing::{info, warn};

use super::definition::{FormDefinition, ResolvedField};
use super::field::{Field, FieldType};
use super::values::FormValues;
use super::FormError;
use crate::conditions::{suggest_fields, validate_rule, Condition, RuleError};

/// identifies the editing session a builder belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new("local")
    }
}

/// mutable view of a form for the designer
pub struct FormBuilder {
    form: FormDefinition,
    session: SessionContext,
    next_field: u64,
    next_condition: u64,
    /// every id seen or handed out in this session, including removed ones
    issued: HashSet<String>,
}

impl FormBuilder {
    pub fn new(mut form: FormDefinition, session: SessionContext) -> Self {
        form.fields.sort_by_key(|f| f.display_order);

        let issued = form
            .fields
            .iter()
            .map(|f| f.id.clone())
            .chain(form.conditions.iter().map(|c| c.id.clone()))
            .collect();

        let mut builder = Self {
            form,
            session,
            next_field: 1,
            next_condition: 1,
            issued,
        };
        builder.resequence();
        builder
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn into_form(self) -> FormDefinition {
        self.form
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // ------------------------------------------------------------------
    // fields
    // ------------------------------------------------------------------

    /// append a field, returning its new id
    pub fn add_field(&mut self, label: impl Into<String>, field_type: FieldType) -> String {
        let index = self.form.fields.len();
        self.insert_field_at(index, label.into(), field_type)
    }

    /// insert a field at a position (e.g. a widget dropped mid-form)
    pub fn insert_field(
        &mut self,
        index: usize,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Result<String, FormError> {
        let len = self.form.fields.len();
        if index > len {
            return Err(FormError::OutOfRange { index, len });
        }
        Ok(self.insert_field_at(index, label.into(), field_type))
    }

    fn insert_field_at(&mut self, index: usize, label: String, field_type: FieldType) -> String {
        let id = self.allocate_field_id();
        self.form
            .fields
            .insert(index, Field::new(id.clone(), label, field_type));
        self.resequence();

        info!(session = %self.session.session_id, field = %id, %field_type, index, "field added");
        id
    }

    /// remove a field and every rule that references it
    pub fn remove_field(&mut self, id: &str) -> Result<Field, FormError> {
        let index = self.field_index(id)?;
        let field = self.form.fields.remove(index);

        let before = self.form.conditions.len();
        self.form.conditions.retain(|c| !c.references(id));
        let dropped = before - self.form.conditions.len();

        self.resequence();

        info!(
            session = %self.session.session_id,
            field = %id,
            dropped_rules = dropped,
            "field removed"
        );
        Ok(field)
    }

    /// move a field to a new position
    pub fn move_field(&mut self, id: &str, to: usize) -> Result<(), FormError> {
        let from = self.field_index(id)?;
        let len = self.form.fields.len();
        if to >= len {
            return Err(FormError::OutOfRange { index: to, len });
        }

        let field = self.form.fields.remove(from);
        self.form.fields.insert(to, field);
        self.resequence();

        info!(session = %self.session.session_id, field = %id, from, to, "field moved");
        Ok(())
    }

    pub fn set_required(&mut self, id: &str, required: bool) -> Result<(), FormError> {
        let index = self.field_index(id)?;
        self.form.fields[index].is_required = required;
        Ok(())
    }

    pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> Result<(), FormError> {
        let index = self.field_index(id)?;
        self.form.fields[index].label = label.into();
        Ok(())
    }

    pub fn set_options(&mut self, id: &str, options: Vec<String>) -> Result<(), FormError> {
        let index = self.field_index(id)?;
        let field = &mut self.form.fields[index];
        if !field.field_type.has_options() {
            warn!(
                field = %id,
                field_type = %field.field_type,
                "options set on a field type that ignores them"
            );
        }
        field.options = options;
        Ok(())
    }

    fn field_index(&self, id: &str) -> Result<usize, FormError> {
        self.form
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormError::UnknownField {
                id: id.to_string(),
                suggestions: suggest_fields(id, &self.form.fields),
            })
    }

    fn resequence(&mut self) {
        for (i, field) in self.form.fields.iter_mut().enumerate() {
            field.display_order = i as u32;
        }
    }

    fn allocate_field_id(&mut self) -> String {
        loop {
            let id = format!("field_{}", self.next_field);
            self.next_field += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    // ------------------------------------------------------------------
    // rules
    // ------------------------------------------------------------------

    /// validate and append a rule, returning its id
    ///
    /// the draft's id is kept when it is set and was never issued in this
    /// session, otherwise a new one is generated.
    pub fn add_condition(&mut self, mut draft: Condition) -> Result<String, RuleError> {
        validate_rule(&draft, &self.form.fields)?;

        if draft.id.is_empty() || !self.issued.insert(draft.id.clone()) {
            draft.id = self.allocate_condition_id();
        }

        info!(session = %self.session.session_id, rule = %draft.id, "{}", draft);
        let id = draft.id.clone();
        self.form.conditions.push(draft);
        Ok(id)
    }

    /// replace a rule in place, keeping its id and position
    pub fn update_condition(&mut self, id: &str, mut draft: Condition) -> Result<(), RuleError> {
        let index = self.condition_index(id)?;
        validate_rule(&draft, &self.form.fields)?;

        draft.id = id.to_string();
        info!(session = %self.session.session_id, rule = %id, "updated: {}", draft);
        self.form.conditions[index] = draft;
        Ok(())
    }

    pub fn remove_condition(&mut self, id: &str) -> Result<Condition, RuleError> {
        let index = self.condition_index(id)?;
        let removed = self.form.conditions.remove(index);

        info!(session = %self.session.session_id, rule = %id, "rule removed");
        Ok(removed)
    }

    fn condition_index(&self, id: &str) -> Result<usize, RuleError> {
        self.form
            .conditions
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))
    }

    fn allocate_condition_id(&mut self) -> String {
        loop {
            let id = format!("cond_{}", self.next_condition);
            self.next_condition += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }

    /// live preview: resolve every field against sample values
    pub fn preview(&self, values: &FormValues) -> Vec<ResolvedField> {
        self.form.resolve_all(values)
    }
}
