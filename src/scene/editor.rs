use std::collections::BTreeSet;

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::StudioResult,
    },
    observer::{Observers, SubscriptionId},
    render::{SceneRenderer, raster::RasterImage},
    scene::{
        history::{History, HistoryState},
        model::{ObjectId, ObjectPatch, ObjectSpec, Scene, SceneObject},
        template::SceneTemplate,
    },
};

/// What happened to the scene, passed to subscribers with a read-only view of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneChange {
    Added(ObjectId),
    Removed(Vec<ObjectId>),
    /// Gesture-in-progress update; not yet in history.
    Modified(ObjectId),
    Committed,
    /// The scene was replaced from history. Not an edit; do not feed it back.
    Reloaded { index: usize },
    SelectionChanged,
}

type SceneCallback = dyn FnMut(&SceneChange, &Scene);

/// 2D canvas editor: working scene, selection and snapshot history.
pub struct SceneEditor {
    scene: Scene,
    selection: BTreeSet<ObjectId>,
    history: History<Scene>,
    next_id: u64,
    restoring: bool,
    observers: Observers<SceneCallback>,
}

impl std::fmt::Debug for SceneEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEditor")
            .field("objects", &self.scene.len())
            .field("selection", &self.selection)
            .field("history_len", &self.history.len())
            .field("history_index", &self.history.index())
            .finish()
    }
}

impl SceneEditor {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_template(canvas, SceneTemplate::Blank)
    }

    pub fn with_template(canvas: Canvas, template: SceneTemplate) -> Self {
        Self::with_options(canvas, template, None)
    }

    /// Baseline snapshot is captured here, so the first edit is always undoable.
    pub fn with_options(
        canvas: Canvas,
        template: SceneTemplate,
        history_limit: Option<usize>,
    ) -> Self {
        let mut scene = Scene::new(canvas, Rgba8::WHITE);
        let next_id = template.install(&mut scene, 1);

        let mut history = History::new(history_limit);
        history.push(scene.clone());

        Self {
            scene,
            selection: BTreeSet::new(),
            history,
            next_id,
            restoring: false,
            observers: Observers::new(),
        }
    }

    /// Start from a previously saved scene; it becomes the baseline snapshot.
    pub fn from_scene(scene: Scene, history_limit: Option<usize>) -> StudioResult<Self> {
        scene.validate()?;
        let next_id = scene.max_id().map_or(1, |id| id.0 + 1);
        let mut history = History::new(history_limit);
        history.push(scene.clone());
        Ok(Self {
            scene,
            selection: BTreeSet::new(),
            history,
            next_id,
            restoring: false,
            observers: Observers::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> &BTreeSet<ObjectId> {
        &self.selection
    }

    pub fn add_object(&mut self, spec: ObjectSpec) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        self.scene.push(SceneObject {
            id,
            placement: spec.placement,
            selectable: true,
            deletable: true,
            kind: spec.kind,
        });
        self.selection.clear();
        self.selection.insert(id);

        self.push_snapshot();
        self.notify(SceneChange::Added(id));
        id
    }

    /// Remove every selected, deletable object. Returns the removed ids.
    pub fn remove_selected(&mut self) -> Vec<ObjectId> {
        if self.selection.is_empty() {
            return Vec::new();
        }

        let selected = std::mem::take(&mut self.selection);
        let mut removed = Vec::new();
        for id in selected {
            let deletable = self.scene.get(id).is_some_and(|o| o.deletable);
            if deletable && self.scene.remove(id).is_some() {
                removed.push(id);
            }
        }

        if removed.is_empty() {
            self.notify(SceneChange::SelectionChanged);
        } else {
            self.push_snapshot();
            self.notify(SceneChange::Removed(removed.clone()));
        }
        removed
    }

    /// Replace the selection. Unknown and non-selectable ids are dropped.
    pub fn select(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        let next: BTreeSet<ObjectId> = ids
            .into_iter()
            .filter(|id| self.scene.get(*id).is_some_and(|o| o.selectable))
            .collect();
        if next != self.selection {
            self.selection = next;
            self.notify(SceneChange::SelectionChanged);
        }
    }

    pub fn select_only(&mut self, id: ObjectId) {
        self.select([id]);
    }

    pub fn clear_selection(&mut self) {
        self.select([]);
    }

    /// Apply a gesture update to the working scene without touching history.
    pub fn modify_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        if !patch.apply(obj) {
            return false;
        }
        self.notify(SceneChange::Modified(id));
        true
    }

    /// End of a gesture. Pushes a snapshot only if the working scene drifted from history.
    pub fn commit(&mut self) -> bool {
        if self.restoring || self.history.current() == Some(&self.scene) {
            return false;
        }
        self.push_snapshot();
        self.notify(SceneChange::Committed);
        true
    }

    pub fn modify_object_committed(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        self.modify_object(id, patch) && self.commit()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[tracing::instrument(skip(self))]
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.reload(snapshot);
                true
            }
            None => false,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                self.reload(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn snapshot_json(&self) -> StudioResult<String> {
        self.scene.to_json()
    }

    pub fn rasterize(&self, renderer: &mut dyn SceneRenderer) -> StudioResult<RasterImage> {
        renderer.render(&self.scene)
    }

    /// Flatten the current scene to PNG bytes.
    #[tracing::instrument(skip(self, renderer))]
    pub fn serialize(&self, renderer: &mut dyn SceneRenderer) -> StudioResult<Vec<u8>> {
        self.rasterize(renderer)?.encode_png()
    }

    pub fn subscribe(&mut self, callback: Box<SceneCallback>) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn push_snapshot(&mut self) {
        if self.restoring {
            return;
        }
        self.history.push(self.scene.clone());
        tracing::debug!(
            len = self.history.len(),
            index = self.history.index(),
            "scene snapshot pushed"
        );
    }

    fn reload(&mut self, snapshot: Scene) {
        self.restoring = true;
        self.scene = snapshot;
        self.selection.clear();
        let index = self.history.index();
        tracing::debug!(index, len = self.history.len(), "scene reloaded from history");
        self.notify(SceneChange::Reloaded { index });
        self.restoring = false;
    }

    fn notify(&mut self, change: SceneChange) {
        let scene = &self.scene;
        self.observers.for_each(|f| f(&change, scene));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::foundation::core::Point;

    fn star() -> ObjectSpec {
        ObjectSpec::glyph_sticker("⭐", Point::new(292.5, 150.0))
    }

    #[test]
    fn new_editor_has_baseline_only() {
        let ed = SceneEditor::new(Canvas::TSHIRT);
        assert_eq!(ed.history_len(), 1);
        assert_eq!(ed.history_state(), HistoryState::AtHead);
        assert!(!ed.can_undo());
        assert!(!ed.can_redo());
    }

    #[test]
    fn add_selects_and_snapshots() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        let id = ed.add_object(star());
        assert_eq!(ed.selection().iter().copied().collect::<Vec<_>>(), vec![id]);
        assert_eq!(ed.history_len(), 2);
        assert!(ed.can_undo());
    }

    #[test]
    fn ids_are_not_reused_after_undo() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        let a = ed.add_object(star());
        assert!(ed.undo());
        let b = ed.add_object(star());
        assert_ne!(a, b);
    }

    #[test]
    fn remove_with_empty_selection_is_noop() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        ed.add_object(star());
        ed.clear_selection();
        assert!(ed.remove_selected().is_empty());
        assert_eq!(ed.history_len(), 2);
    }

    #[test]
    fn guides_cannot_be_selected_or_removed() {
        let mut ed = SceneEditor::with_template(Canvas::TSHIRT, SceneTemplate::TShirt);
        let guide = ed.scene().objects[0].id;
        ed.select_only(guide);
        assert!(ed.selection().is_empty());
        assert!(ed.remove_selected().is_empty());
        assert_eq!(ed.scene().len(), 7);
        assert_eq!(ed.history_len(), 1);
    }

    #[test]
    fn gesture_commits_once() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        let id = ed.add_object(star());
        for x in [10.0, 20.0, 30.0] {
            assert!(ed.modify_object(id, &ObjectPatch::move_to(x, 40.0)));
        }
        assert_eq!(ed.history_len(), 2);
        assert!(ed.commit());
        assert_eq!(ed.history_len(), 3);
        assert!(!ed.commit());
    }

    #[test]
    fn modify_missing_id_is_ignored() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        assert!(!ed.modify_object(ObjectId(99), &ObjectPatch::move_to(1.0, 1.0)));
        assert!(!ed.modify_object_committed(ObjectId(99), &ObjectPatch::move_to(1.0, 1.0)));
        assert_eq!(ed.history_len(), 1);
    }

    #[test]
    fn undo_drops_uncommitted_gesture() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        let id = ed.add_object(star());
        ed.modify_object(id, &ObjectPatch::move_to(1.0, 1.0));
        assert!(ed.undo());
        assert!(ed.scene().is_empty());
        assert!(ed.redo());
        let obj = ed.scene().get(id).unwrap();
        assert_eq!(obj.placement.position, Point::new(292.5, 150.0));
    }

    #[test]
    fn subscribers_see_reloads() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        let log = seen.clone();
        let sub = ed.subscribe(Box::new(move |change, scene| {
            log.borrow_mut().push((change.clone(), scene.len()));
        }));

        ed.add_object(star());
        ed.undo();
        assert_eq!(
            *seen.borrow(),
            vec![
                (SceneChange::Added(ObjectId(1)), 1),
                (SceneChange::Reloaded { index: 0 }, 0),
            ]
        );

        assert!(ed.unsubscribe(sub));
        ed.redo();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn from_scene_continues_id_sequence() {
        let mut ed = SceneEditor::new(Canvas::TSHIRT);
        ed.add_object(star());
        ed.add_object(star());
        let json = ed.snapshot_json().unwrap();

        let scene = Scene::from_json(&json).unwrap();
        let mut restored = SceneEditor::from_scene(scene, None).unwrap();
        assert_eq!(restored.add_object(star()), ObjectId(3));
    }
}
