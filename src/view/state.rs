//! Per-mount state of one entity view and its pure transitions.
//!
//! Every operation is split in two. A `prepare_*` method validates the form,
//! updates bookkeeping and hands back a [`Ticket`] plus a [`Request`]. Once
//! the request has run, [`EntityView::apply`] takes the [`Completion`] and
//! either transforms the list or reports why it did not.
//!
//! Ordering rules:
//! - Load and both searches bump `generation`; their replies apply only while
//!   their generation is still current, so the newest list replacement wins.
//! - Create, update and delete carry the generation they were issued under and
//!   apply only if no list replacement happened since. They transform the
//!   list as it is when the reply arrives.
//! - Related-item replies carry `related_seq` and apply only if they are the
//!   latest fetch and the same id is still selected.
//! - Replies for another mount are dropped.

use std::collections::HashSet;

use super::pager::Pager;
use crate::api::ApiError;
use crate::entity::{Entity, RelatedItem};
use crate::form::{Field, FormBuffer, ValidationError};
use crate::util::{shorten, strip_control_chars};

/// Form field holding the id for search-by-id.
pub const SEARCH_FIELD: &str = "searchId";

/// Fields of the form for `E`: its editable fields, then the id search input,
/// then the filter input when `E` has one.
pub fn form_fields<E: Entity>() -> Vec<Field> {
    let mut fields = E::FIELDS.to_vec();
    fields.push(Field::optional(SEARCH_FIELD, "Find by id"));
    if let Some(filter) = E::FILTER {
        fields.push(Field::optional(filter.key, filter.label));
    }
    fields
}

/// Identifies which mount and which round of requests a reply belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub mount: u64,
    pub generation: u64,
}

#[derive(Debug)]
pub enum Request<E: Entity> {
    LoadAll,
    SearchById(String),
    SearchByFilter { key: &'static str, value: String },
    Create(E::Draft),
    Update { id: i64, record: E },
    Delete(i64),
    Related { id: i64 },
}

impl<E: Entity> Request<E> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadAll => "load",
            Self::SearchById(_) => "search_by_id",
            Self::SearchByFilter { .. } => "search_by_filter",
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
            Self::Related { .. } => "related",
        }
    }
}

#[derive(Debug)]
pub enum Outcome<E> {
    Loaded(Result<Vec<E>, ApiError>),
    Found(Result<E, ApiError>),
    Filtered(Result<Vec<E>, ApiError>),
    Created(Result<E, ApiError>),
    Updated {
        id: i64,
        result: Result<E, ApiError>,
    },
    Deleted {
        id: i64,
        result: Result<(), ApiError>,
    },
    Related {
        id: i64,
        result: Result<Vec<RelatedItem>, ApiError>,
    },
}

/// A finished request on its way back to the view that issued it.
#[derive(Debug)]
pub struct Completion<E> {
    pub ticket: Ticket,
    pub outcome: Outcome<E>,
}

/// What happened when a completion was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// List or panel changed; confirmation for the status bar.
    Done(String),
    /// Reply was out of date and ignored.
    Stale,
    /// Request failed; list untouched.
    Failed { message: String, transport: bool },
}

impl Applied {
    fn failed(err: &ApiError) -> Self {
        Self::Failed {
            message: err.to_string(),
            transport: err.is_transport(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A list replacement (load or search) is in flight.
    Loading,
}

/// Contents of the related-items panel for the selected row.
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedPanel {
    Loading,
    Loaded(Vec<RelatedItem>),
    Failed(String),
}

/// One rendered list row, already sanitized and shortened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub headline: String,
    pub detail: String,
    pub selected: bool,
    pub under_cursor: bool,
}

#[derive(Debug)]
pub struct EntityView<E: Entity> {
    mount: u64,
    items: Vec<E>,
    form: FormBuffer,
    selection: Option<i64>,
    related: Option<RelatedPanel>,
    phase: Phase,
    generation: u64,
    related_seq: u64,
    pager: Pager,
}

impl<E: Entity> EntityView<E> {
    pub fn new(mount: u64) -> Self {
        Self {
            mount,
            items: Vec::new(),
            form: FormBuffer::new(form_fields::<E>()),
            selection: None,
            related: None,
            phase: Phase::Idle,
            generation: 0,
            related_seq: 0,
            pager: Pager::default(),
        }
    }

    pub fn mount(&self) -> u64 {
        self.mount
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn form(&self) -> &FormBuffer {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormBuffer {
        &mut self.form
    }

    pub fn selection(&self) -> Option<i64> {
        self.selection
    }

    pub fn related(&self) -> Option<&RelatedPanel> {
        self.related.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drop back to idle when the request issued under `ticket` will never
    /// reply. Tickets from an older mount or generation change nothing.
    pub fn settle(&mut self, ticket: Ticket) {
        if ticket.mount == self.mount && ticket.generation == self.generation {
            self.phase = Phase::Idle;
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Id of the row under the cursor.
    pub fn cursor_id(&self) -> Option<i64> {
        self.items.get(self.pager.cursor()).map(Entity::id)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        self.pager.move_by(delta, self.items.len());
    }

    pub fn move_page(&mut self, pages: isize) {
        self.pager.page_by(pages, self.items.len());
    }

    /// Recompute the page size for `rows` lines of list area.
    pub fn resize(&mut self, rows: u16) {
        self.pager.resize(rows, E::ROW_HEIGHT);
    }

    /// Copy the cursor row's editable fields into the form, ready for update.
    pub fn edit_cursor_row(&mut self) -> Result<i64, ValidationError> {
        let record = self
            .items
            .get(self.pager.cursor())
            .ok_or(ValidationError::NoRecord)?;
        let value = serde_json::to_value(record).unwrap_or_default();
        for field in E::FIELDS {
            let text = value
                .get(field.name)
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            self.form.set(field.name, text);
        }
        Ok(record.id())
    }

    fn ticket(&self, generation: u64) -> Ticket {
        Ticket {
            mount: self.mount,
            generation,
        }
    }

    fn bump(&mut self) -> Ticket {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Loading;
        self.ticket(self.generation)
    }

    // ========================================================================
    // Prepare
    // ========================================================================

    pub fn begin_load(&mut self) -> (Ticket, Request<E>) {
        (self.bump(), Request::LoadAll)
    }

    pub fn prepare_create(
        &self,
        author: Option<i64>,
    ) -> Result<(Ticket, Request<E>), ValidationError> {
        self.require_fields()?;
        let draft = E::draft(&self.form, author);
        Ok((self.ticket(self.generation), Request::Create(draft)))
    }

    pub fn prepare_update(&self, id: i64) -> Result<(Ticket, Request<E>), ValidationError> {
        let current = self
            .items
            .iter()
            .find(|item| item.id() == id)
            .ok_or(ValidationError::NotInList(E::KIND.noun(), id))?;
        self.require_fields()?;
        let record = current.revise(&self.form);
        Ok((self.ticket(self.generation), Request::Update { id, record }))
    }

    /// Deleting an id that is not in the list is allowed; the reply then
    /// leaves the list as it is.
    pub fn prepare_delete(&self, id: i64) -> (Ticket, Request<E>) {
        (self.ticket(self.generation), Request::Delete(id))
    }

    pub fn prepare_search_by_id(&mut self) -> Result<(Ticket, Request<E>), ValidationError> {
        let id = self.form.search_input(SEARCH_FIELD)?;
        Ok((self.bump(), Request::SearchById(id)))
    }

    pub fn prepare_filter(&mut self) -> Result<(Ticket, Request<E>), ValidationError> {
        let filter = E::FILTER.ok_or(ValidationError::NoFilter(E::KIND.label()))?;
        let value = self.form.search_input(filter.key)?;
        Ok((
            self.bump(),
            Request::SearchByFilter {
                key: filter.key,
                value,
            },
        ))
    }

    /// Select `id`, or clear the selection if `id` was already selected.
    ///
    /// Returns a related-items fetch when `E` has related records.
    pub fn toggle_selection(&mut self, id: i64) -> Option<(Ticket, Request<E>)> {
        if self.selection == Some(id) {
            self.selection = None;
            self.related = None;
            return None;
        }

        self.selection = Some(id);
        if E::RELATED.is_none() {
            return None;
        }
        self.related_seq = self.related_seq.wrapping_add(1);
        self.related = Some(RelatedPanel::Loading);
        Some((self.ticket(self.related_seq), Request::Related { id }))
    }

    pub fn reset_form(&mut self) {
        self.form.clear();
    }

    fn require_fields(&self) -> Result<(), ValidationError> {
        let names: Vec<&str> = E::FIELDS.iter().map(|f| f.name).collect();
        self.form.require(&names)
    }

    // ========================================================================
    // Apply
    // ========================================================================

    pub fn apply(&mut self, completion: Completion<E>) -> Applied {
        let Completion { ticket, outcome } = completion;
        if ticket.mount != self.mount {
            return Applied::Stale;
        }

        let noun = E::KIND.noun();
        match outcome {
            Outcome::Loaded(result) => self.apply_replacement(ticket, result, |items| {
                format!("Loaded {} {}", items.len(), E::KIND.label().to_lowercase())
            }),
            Outcome::Found(result) => {
                self.apply_replacement(ticket, result.map(|record| vec![record]), |items| {
                    match items.first() {
                        Some(record) => format!("Found {} #{}", noun, record.id()),
                        None => format!("No {} found", noun),
                    }
                })
            }
            Outcome::Filtered(result) => self.apply_replacement(ticket, result, |items| {
                format!("Found {} {}", items.len(), E::KIND.label().to_lowercase())
            }),
            Outcome::Created(result) => {
                if ticket.generation != self.generation {
                    return Applied::Stale;
                }
                match result {
                    Ok(record) => {
                        let id = record.id();
                        self.upsert(record);
                        self.form.clear();
                        Applied::Done(format!("Created {} #{}", noun, id))
                    }
                    Err(e) => Applied::failed(&e),
                }
            }
            Outcome::Updated { id, result } => {
                if ticket.generation != self.generation {
                    return Applied::Stale;
                }
                match result {
                    Ok(record) if record.id() != id => Applied::Failed {
                        message: format!(
                            "Request failed: server returned {} #{} for #{}",
                            noun,
                            record.id(),
                            id
                        ),
                        transport: false,
                    },
                    Ok(record) => {
                        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
                            *slot = record;
                        }
                        self.form.clear();
                        Applied::Done(format!("Updated {} #{}", noun, id))
                    }
                    Err(e) => Applied::failed(&e),
                }
            }
            Outcome::Deleted { id, result } => {
                if ticket.generation != self.generation {
                    return Applied::Stale;
                }
                match result {
                    Ok(()) => {
                        self.items.retain(|item| item.id() != id);
                        if self.selection == Some(id) {
                            self.selection = None;
                            self.related = None;
                        }
                        self.pager.clamp(self.items.len());
                        Applied::Done(format!("Deleted {} #{}", noun, id))
                    }
                    Err(e) => Applied::failed(&e),
                }
            }
            Outcome::Related { id, result } => {
                if ticket.generation != self.related_seq || self.selection != Some(id) {
                    return Applied::Stale;
                }
                match result {
                    Ok(items) => {
                        let count = items.len();
                        self.related = Some(RelatedPanel::Loaded(items));
                        let label = E::RELATED.map(|r| r.label).unwrap_or("Related items");
                        Applied::Done(format!("{} for #{}: {}", label, id, count))
                    }
                    Err(e) => {
                        self.related = Some(RelatedPanel::Failed(e.to_string()));
                        Applied::failed(&e)
                    }
                }
            }
        }
    }

    fn apply_replacement(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<E>, ApiError>,
        confirm: impl FnOnce(&[E]) -> String,
    ) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        self.phase = Phase::Idle;
        match result {
            Ok(items) => {
                self.items = dedup_by_id(items);
                self.selection = None;
                self.related = None;
                self.pager.reset();
                Applied::Done(confirm(&self.items))
            }
            Err(e) => Applied::failed(&e),
        }
    }

    /// Append `record`, or replace the existing record with the same id.
    fn upsert(&mut self, record: E) {
        match self.items.iter_mut().find(|item| item.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.items.push(record),
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Rows of the page holding the cursor.
    pub fn rows(&self) -> Vec<Row> {
        let cursor = self.pager.cursor();
        let range = self.pager.page_range(self.items.len());
        let start = range.start;
        self.items[range]
            .iter()
            .enumerate()
            .map(|(offset, item)| Row {
                id: item.id(),
                headline: display_text(item.headline(), E::DISPLAY_LIMIT),
                detail: display_text(&item.detail(), E::DISPLAY_LIMIT),
                selected: self.selection == Some(item.id()),
                under_cursor: start + offset == cursor,
            })
            .collect()
    }
}

fn display_text(raw: &str, limit: usize) -> String {
    let clean = strip_control_chars(raw);
    // rows are single-line
    let flat = clean.replace(['\n', '\r', '\t'], " ");
    shorten(&flat, limit).into_owned()
}

/// Keep the first record for each id, in server order.
fn dedup_by_id<E: Entity>(items: Vec<E>) -> Vec<E> {
    let total = items.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<E> = items
        .into_iter()
        .filter(|item| seen.insert(item.id()))
        .collect();
    if kept.len() < total {
        tracing::warn!(
            kind = E::KIND.label(),
            dropped = total - kept.len(),
            "Dropped records with duplicate ids"
        );
    }
    kept
}
