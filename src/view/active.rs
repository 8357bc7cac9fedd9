use super::request::execute;
use super::state::{Applied, Completion, EntityView, Phase, RelatedPanel, Request, Row, Ticket};
use crate::api::ResourceClient;
use crate::entity::{Album, Comment, Entity, EntityKind, Post, User};
use crate::form::{FormBuffer, ValidationError};

/// The mounted entity view, one variant per kind.
#[derive(Debug)]
pub enum ActiveView {
    Posts(EntityView<Post>),
    Comments(EntityView<Comment>),
    Albums(EntityView<Album>),
    Users(EntityView<User>),
}

/// A completion tagged with the kind of view that issued it.
#[derive(Debug)]
pub enum Delivery {
    Posts(Completion<Post>),
    Comments(Completion<Comment>),
    Albums(Completion<Album>),
    Users(Completion<User>),
}

/// A prepared request not yet sent.
#[derive(Debug)]
pub enum Pending {
    Posts(Ticket, Request<Post>),
    Comments(Ticket, Request<Comment>),
    Albums(Ticket, Request<Album>),
    Users(Ticket, Request<User>),
}

/// User-level operations on the mounted view. Row operations act on the row
/// under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
    Create,
    Update,
    Delete,
    ToggleSelection,
    SearchById,
    SearchByFilter,
    /// Copy the cursor row into the form.
    EditRow,
    ResetForm,
}

/// Run `$body` with `$view` bound to the inner `EntityView` and `$pend` bound
/// to the matching [`Pending`] constructor.
macro_rules! with_view {
    ($active:expr, |$view:ident, $pend:ident| $body:expr) => {
        match $active {
            ActiveView::Posts($view) => {
                #[allow(unused_variables)]
                let $pend = Pending::Posts;
                $body
            }
            ActiveView::Comments($view) => {
                #[allow(unused_variables)]
                let $pend = Pending::Comments;
                $body
            }
            ActiveView::Albums($view) => {
                #[allow(unused_variables)]
                let $pend = Pending::Albums;
                $body
            }
            ActiveView::Users($view) => {
                #[allow(unused_variables)]
                let $pend = Pending::Users;
                $body
            }
        }
    };
}

impl ActiveView {
    /// Fresh view state for `kind`.
    pub fn mount(kind: EntityKind, mount: u64) -> Self {
        match kind {
            EntityKind::Posts => Self::Posts(EntityView::new(mount)),
            EntityKind::Comments => Self::Comments(EntityView::new(mount)),
            EntityKind::Albums => Self::Albums(EntityView::new(mount)),
            EntityKind::Users => Self::Users(EntityView::new(mount)),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Posts(_) => EntityKind::Posts,
            Self::Comments(_) => EntityKind::Comments,
            Self::Albums(_) => EntityKind::Albums,
            Self::Users(_) => EntityKind::Users,
        }
    }

    pub fn mount_id(&self) -> u64 {
        with_view!(self, |view, _pend| view.mount())
    }

    /// Initial list load, also used for reload.
    pub fn start(&mut self) -> Pending {
        with_view!(self, |view, pend| {
            let (ticket, request) = view.begin_load();
            pend(ticket, request)
        })
    }

    /// Prepare `command`. `Ok(None)` means the command finished locally.
    pub fn run(
        &mut self,
        command: Command,
        author: Option<i64>,
    ) -> Result<Option<Pending>, ValidationError> {
        with_view!(self, |view, pend| {
            let prepared = match command {
                Command::Reload => Some(view.begin_load()),
                Command::Create => Some(view.prepare_create(author)?),
                Command::Update => {
                    let id = view.cursor_id().ok_or(ValidationError::NoRecord)?;
                    Some(view.prepare_update(id)?)
                }
                Command::Delete => {
                    let id = view.cursor_id().ok_or(ValidationError::NoRecord)?;
                    Some(view.prepare_delete(id))
                }
                Command::ToggleSelection => {
                    let id = view.cursor_id().ok_or(ValidationError::NoRecord)?;
                    view.toggle_selection(id)
                }
                Command::SearchById => Some(view.prepare_search_by_id()?),
                Command::SearchByFilter => Some(view.prepare_filter()?),
                Command::EditRow => {
                    view.edit_cursor_row()?;
                    None
                }
                Command::ResetForm => {
                    view.reset_form();
                    None
                }
            };
            Ok(prepared.map(|(ticket, request)| pend(ticket, request)))
        })
    }

    /// Apply a delivery. Deliveries for another kind are stale.
    pub fn apply(&mut self, delivery: Delivery) -> Applied {
        match (self, delivery) {
            (Self::Posts(view), Delivery::Posts(c)) => view.apply(c),
            (Self::Comments(view), Delivery::Comments(c)) => view.apply(c),
            (Self::Albums(view), Delivery::Albums(c)) => view.apply(c),
            (Self::Users(view), Delivery::Users(c)) => view.apply(c),
            _ => Applied::Stale,
        }
    }

    // ========================================================================
    // Navigation and rendering accessors
    // ========================================================================

    pub fn form(&self) -> &FormBuffer {
        with_view!(self, |view, _pend| view.form())
    }

    pub fn form_mut(&mut self) -> &mut FormBuffer {
        with_view!(self, |view, _pend| view.form_mut())
    }

    pub fn rows(&self) -> Vec<Row> {
        with_view!(self, |view, _pend| view.rows())
    }

    pub fn len(&self) -> usize {
        with_view!(self, |view, _pend| view.items().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn phase(&self) -> Phase {
        with_view!(self, |view, _pend| view.phase())
    }

    pub fn settle(&mut self, ticket: Ticket) {
        with_view!(self, |view, _pend| view.settle(ticket))
    }

    pub fn selection(&self) -> Option<i64> {
        with_view!(self, |view, _pend| view.selection())
    }

    pub fn related(&self) -> Option<&RelatedPanel> {
        with_view!(self, |view, _pend| view.related())
    }

    /// Title of the related-items panel, if this kind has one.
    pub fn related_label(&self) -> Option<&'static str> {
        match self {
            Self::Posts(_) => Post::RELATED.map(|r| r.label),
            Self::Comments(_) => Comment::RELATED.map(|r| r.label),
            Self::Albums(_) => Album::RELATED.map(|r| r.label),
            Self::Users(_) => User::RELATED.map(|r| r.label),
        }
    }

    pub fn row_height(&self) -> u16 {
        match self {
            Self::Posts(_) => Post::ROW_HEIGHT,
            Self::Comments(_) => Comment::ROW_HEIGHT,
            Self::Albums(_) => Album::ROW_HEIGHT,
            Self::Users(_) => User::ROW_HEIGHT,
        }
    }

    /// Filter field name, if this kind supports filter search.
    pub fn filter_key(&self) -> Option<&'static str> {
        match self {
            Self::Posts(_) => Post::FILTER.map(|f| f.key),
            Self::Comments(_) => Comment::FILTER.map(|f| f.key),
            Self::Albums(_) => Album::FILTER.map(|f| f.key),
            Self::Users(_) => User::FILTER.map(|f| f.key),
        }
    }

    /// Current page (1-based) and page count.
    pub fn page_position(&self) -> (usize, usize) {
        with_view!(self, |view, _pend| {
            let pager = view.pager();
            (pager.page() + 1, pager.page_count(view.items().len()))
        })
    }

    pub fn move_cursor(&mut self, delta: isize) {
        with_view!(self, |view, _pend| view.move_cursor(delta))
    }

    pub fn move_page(&mut self, pages: isize) {
        with_view!(self, |view, _pend| view.move_page(pages))
    }

    pub fn resize(&mut self, rows: u16) {
        with_view!(self, |view, _pend| view.resize(rows))
    }
}

impl Pending {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Posts(..) => EntityKind::Posts,
            Self::Comments(..) => EntityKind::Comments,
            Self::Albums(..) => EntityKind::Albums,
            Self::Users(..) => EntityKind::Users,
        }
    }

    /// Operation name for logs.
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Posts(ticket, _)
            | Self::Comments(ticket, _)
            | Self::Albums(ticket, _)
            | Self::Users(ticket, _) => *ticket,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Posts(_, r) => r.name(),
            Self::Comments(_, r) => r.name(),
            Self::Albums(_, r) => r.name(),
            Self::Users(_, r) => r.name(),
        }
    }

    /// Send the request and tag the outcome for delivery back to the view.
    pub async fn execute(self, client: &ResourceClient) -> Delivery {
        match self {
            Self::Posts(ticket, request) => complete(client, ticket, request).await,
            Self::Comments(ticket, request) => complete(client, ticket, request).await,
            Self::Albums(ticket, request) => complete(client, ticket, request).await,
            Self::Users(ticket, request) => complete(client, ticket, request).await,
        }
    }
}

async fn complete<E: Entity>(
    client: &ResourceClient,
    ticket: Ticket,
    request: Request<E>,
) -> Delivery {
    let outcome = execute(client, request).await;
    E::deliver(Completion { ticket, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Outcome;

    #[test]
    fn test_mount_and_start_load() {
        let mut active = ActiveView::mount(EntityKind::Albums, 3);
        assert_eq!(active.kind(), EntityKind::Albums);
        assert_eq!(active.mount_id(), 3);

        let pending = active.start();
        assert_eq!(pending.kind(), EntityKind::Albums);
        assert_eq!(pending.name(), "load");
        assert_eq!(active.phase(), Phase::Loading);
    }

    #[test]
    fn test_delivery_for_other_kind_is_stale() {
        let mut active = ActiveView::mount(EntityKind::Posts, 1);
        let delivery = Delivery::Users(Completion {
            ticket: Ticket {
                mount: 1,
                generation: 1,
            },
            outcome: Outcome::Loaded(Ok(vec![])),
        });
        assert_eq!(active.apply(delivery), Applied::Stale);
    }

    #[test]
    fn test_row_commands_need_a_row() {
        let mut active = ActiveView::mount(EntityKind::Posts, 1);
        assert_eq!(
            active.run(Command::Delete, None).unwrap_err(),
            ValidationError::NoRecord
        );
        assert_eq!(
            active.run(Command::ToggleSelection, None).unwrap_err(),
            ValidationError::NoRecord
        );
    }

    #[test]
    fn test_reset_form_is_local() {
        let mut active = ActiveView::mount(EntityKind::Comments, 1);
        active.form_mut().set("name", "x");
        assert!(active.run(Command::ResetForm, None).unwrap().is_none());
        assert!(active.form().is_clear());
    }

    #[test]
    fn test_comment_create_validation_names_fields() {
        let mut active = ActiveView::mount(EntityKind::Comments, 1);
        active.form_mut().set("email", "a@b.c");
        let err = active.run(Command::Create, None).unwrap_err();
        assert_eq!(err.to_string(), "Name and Body cannot be empty");
    }

    #[test]
    fn test_capabilities_per_kind() {
        assert_eq!(ActiveView::mount(EntityKind::Users, 1).filter_key(), None);
        assert_eq!(
            ActiveView::mount(EntityKind::Comments, 1).filter_key(),
            Some("postId")
        );
        assert_eq!(ActiveView::mount(EntityKind::Comments, 1).related_label(), None);
        assert_eq!(
            ActiveView::mount(EntityKind::Albums, 1).related_label(),
            Some("Photos")
        );
    }
}
