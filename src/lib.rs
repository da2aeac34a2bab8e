pub mod canvas;
pub mod config;
pub mod error;
pub mod gesture;
pub mod layout;
pub mod measure;
pub mod model;
pub mod relationship;
pub mod scene;
pub mod svg;

use std::cell::RefCell;

use tracing::warn;
use wasm_bindgen::prelude::*;

use canvas::{Canvas, Notification, NotificationQueue};
use config::CanvasConfig;
use gesture::GestureOutcome;
use layout::Point;
use model::{Catalog, FieldRef};
use svg::SvgRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// JavaScript callbacks registered by the host.
#[derive(Clone, Default)]
struct Callbacks {
    on_move: Option<js_sys::Function>,
    on_remove: Option<js_sys::Function>,
    on_relationship: Option<js_sys::Function>,
}

impl Callbacks {
    fn deliver(&self, notification: &Notification) {
        let result = match notification {
            Notification::EntityMoved { entity, position } => self.on_move.as_ref().map(|f| {
                f.call3(
                    &JsValue::NULL,
                    &JsValue::from_str(entity),
                    &JsValue::from_f64(position.x),
                    &JsValue::from_f64(position.y),
                )
            }),
            Notification::EntityRemoved(entity) => self
                .on_remove
                .as_ref()
                .map(|f| f.call1(&JsValue::NULL, &JsValue::from_str(entity))),
            Notification::RelationshipCreated(relationship) => {
                let Some(f) = &self.on_relationship else {
                    return;
                };
                match serde_json::to_string(relationship) {
                    Ok(json) => Some(f.call1(&JsValue::NULL, &JsValue::from_str(&json))),
                    Err(err) => {
                        warn!(error = %err, "relationship could not be serialized for callback");
                        None
                    }
                }
            }
        };
        if let Some(Err(err)) = result {
            warn!(?err, ?notification, "canvas callback threw");
        }
    }
}

/// Schema designer canvas for a JavaScript host. Positions and scenes
/// cross the boundary as JSON strings, rejections as error strings.
///
/// Callbacks run after the operation that caused them has released the
/// canvas, so they may call back into the designer.
#[wasm_bindgen]
pub struct Designer {
    canvas: RefCell<Canvas<NotificationQueue>>,
    callbacks: RefCell<Callbacks>,
}

impl Designer {
    fn commit<R>(&self, op: impl FnOnce(&mut Canvas<NotificationQueue>) -> R) -> R {
        let callbacks = self.callbacks.borrow().clone();
        self.commit_with(op, |notification| callbacks.deliver(notification))
    }

    fn commit_with<R>(
        &self,
        op: impl FnOnce(&mut Canvas<NotificationQueue>) -> R,
        mut deliver: impl FnMut(&Notification),
    ) -> R {
        let (result, pending) = {
            let mut canvas = self.canvas.borrow_mut();
            let result = op(&mut canvas);
            (result, canvas.observer_mut().drain())
        };
        for notification in &pending {
            deliver(notification);
        }
        result
    }
}

#[wasm_bindgen]
impl Designer {
    #[wasm_bindgen(constructor)]
    pub fn new(catalog: &str, config: Option<String>) -> Result<Designer, String> {
        let catalog = Catalog::from_json(catalog).map_err(|e| e.to_string())?;
        let config = match config {
            Some(json) => CanvasConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => CanvasConfig::default(),
        };
        Ok(Designer {
            canvas: RefCell::new(Canvas::with_observer(
                catalog,
                config,
                NotificationQueue::default(),
            )),
            callbacks: RefCell::new(Callbacks::default()),
        })
    }

    #[wasm_bindgen(js_name = "onTableMove")]
    pub fn on_table_move(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_move = Some(callback);
    }

    #[wasm_bindgen(js_name = "onTableRemove")]
    pub fn on_table_remove(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_remove = Some(callback);
    }

    #[wasm_bindgen(js_name = "onRelationshipCreate")]
    pub fn on_relationship_create(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_relationship = Some(callback);
    }

    /// Place a table in the first free grid cell; returns the position as JSON.
    #[wasm_bindgen(js_name = "placeTable")]
    pub fn place_table(&self, id: &str) -> Result<String, String> {
        let position = self
            .commit(|canvas| canvas.place_entity(id))
            .map_err(|e| e.to_string())?;
        to_json(&position)
    }

    /// Place a table dropped from the catalog at the pointer.
    #[wasm_bindgen(js_name = "dropTable")]
    pub fn drop_table(&self, id: &str, x: f64, y: f64) -> Result<String, String> {
        let position = self
            .commit(|canvas| canvas.place_entity_at(id, Point::new(x, y)))
            .map_err(|e| e.to_string())?;
        to_json(&position)
    }

    #[wasm_bindgen(js_name = "removeTable")]
    pub fn remove_table(&self, id: &str) -> Result<(), String> {
        self.commit(|canvas| canvas.remove_entity(id))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "moveTable")]
    pub fn move_table(&self, id: &str, x: f64, y: f64) -> Result<String, String> {
        let position = self
            .commit(|canvas| canvas.move_entity(id, Point::new(x, y)))
            .map_err(|e| e.to_string())?;
        to_json(&position)
    }

    #[wasm_bindgen(js_name = "pointerDownOnTable")]
    pub fn pointer_down_on_table(&self, id: &str, x: f64, y: f64) -> bool {
        self.commit(|canvas| canvas.pointer_down_on_entity(id, Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = "pointerDownOnColumn")]
    pub fn pointer_down_on_column(&self, table: &str, column: &str, x: f64, y: f64) -> bool {
        self.commit(|canvas| {
            canvas.pointer_down_on_field(FieldRef::new(table, column), Point::new(x, y))
        })
    }

    /// Pointer down at a raw canvas point: a column row starts a connection,
    /// anywhere else on a table starts a move.
    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&self, x: f64, y: f64) -> bool {
        let point = Point::new(x, y);
        self.commit(|canvas| {
            if let Some(field) = canvas.field_at(point) {
                return canvas.pointer_down_on_field(field, point);
            }
            match canvas.entity_at(point).map(str::to_string) {
                Some(id) => canvas.pointer_down_on_entity(&id, point),
                None => false,
            }
        })
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.commit(|canvas| canvas.pointer_move(Point::new(x, y)).is_some())
    }

    /// Release the pointer at a canvas point. Resolves to `"ignored"`,
    /// `"discarded"`, `"moved"` or `"connected"`.
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&self, x: f64, y: f64) -> Result<String, String> {
        let outcome = self
            .commit(|canvas| {
                let target = canvas.field_at(Point::new(x, y));
                canvas.pointer_up(target.as_ref())
            })
            .map_err(|e| e.to_string())?;
        Ok(match outcome {
            GestureOutcome::Ignored => "ignored",
            GestureOutcome::Discarded => "discarded",
            GestureOutcome::Move { .. } => "moved",
            GestureOutcome::Connect(_) => "connected",
        }
        .to_string())
    }

    #[wasm_bindgen(js_name = "pointerCancel")]
    pub fn pointer_cancel(&self) -> bool {
        self.commit(|canvas| canvas.pointer_cancel())
    }

    pub fn relationships(&self) -> Result<String, String> {
        to_json(self.canvas.borrow().relationships())
    }

    pub fn scene(&self) -> Result<String, String> {
        self.canvas.borrow().scene().to_json().map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "renderSvg")]
    pub fn render_svg(&self) -> String {
        let canvas = self.canvas.borrow();
        SvgRenderer::new(canvas.config().table).render(&canvas.scene())
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::Relationship;

    const CATALOG: &str = r#"[
        {"id": "1", "name": "Users",
         "columns": [{"name": "id", "type": "uuid", "isPrimary": true}]},
        {"id": "2", "name": "Orders", "columns": [{"name": "user_id", "type": "uuid"}]}
    ]"#;

    fn designer() -> Designer {
        Designer::new(CATALOG, None).unwrap()
    }

    #[test]
    fn test_delivery_sees_committed_state() {
        let d = designer();
        d.place_table("1").unwrap();

        let mut seen = Vec::new();
        d.commit_with(
            |canvas| canvas.move_entity("1", Point::new(400.0, 0.0)),
            |notification| {
                // The canvas is free again: reads and re-entrant calls succeed.
                let position = d.canvas.borrow().position("1");
                assert!(d.scene().is_ok());
                seen.push((notification.clone(), position));
            },
        )
        .unwrap();

        assert_eq!(
            seen,
            vec![(
                Notification::EntityMoved {
                    entity: "1".into(),
                    position: Point::new(400.0, 0.0),
                },
                Some(Point::new(400.0, 0.0)),
            )]
        );
    }

    #[test]
    fn test_callback_may_mutate_designer() {
        let d = designer();
        d.place_table("1").unwrap();
        d.place_table("2").unwrap();

        let mut removed = None;
        d.commit_with(
            |canvas| {
                canvas.create_relationship(Relationship::new(
                    FieldRef::new("1", "id"),
                    FieldRef::new("2", "user_id"),
                ))
            },
            |_| removed = Some(d.remove_table("2")),
        )
        .unwrap();

        assert_eq!(removed, Some(Ok(())));
        assert_eq!(d.relationships().unwrap(), "[]");
        assert!(d.canvas.borrow().observer().is_empty());
    }

    #[test]
    fn test_rejection_queues_nothing() {
        let d = designer();
        let mut delivered = 0;
        let result = d.commit_with(
            |canvas| canvas.move_entity("1", Point::new(0.0, 0.0)),
            |_| delivered += 1,
        );
        assert!(result.is_err());
        assert_eq!(delivered, 0);
    }
}
