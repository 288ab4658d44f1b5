//! Handles to state shared between the ECS world and the Lua host.
//!
//! Scripts create nodes, load palettes and register providers directly
//! while they run, and the systems read the same objects every frame. Both
//! sides hold an `Rc<RefCell<_>>` to one instance. Everything runs on the
//! main thread, so these are NonSend resources. A system never holds a
//! borrow across a call into Lua.

use std::cell::RefCell;
use std::rc::Rc;

use crate::resources::loader::Loader;
use crate::resources::palette::PaletteRegistry;
use crate::scene::SceneTree;

#[derive(Clone, Default)]
pub struct SharedScene(pub Rc<RefCell<SceneTree>>);

#[derive(Clone, Default)]
pub struct SharedPalettes(pub Rc<RefCell<PaletteRegistry>>);

#[derive(Clone)]
pub struct SharedLoader(pub Rc<RefCell<Loader>>);

impl SharedScene {
    pub fn new(tree: SceneTree) -> Self {
        Self(Rc::new(RefCell::new(tree)))
    }
}

impl SharedPalettes {
    pub fn new(registry: PaletteRegistry) -> Self {
        Self(Rc::new(RefCell::new(registry)))
    }
}

impl SharedLoader {
    pub fn new(loader: Loader) -> Self {
        Self(Rc::new(RefCell::new(loader)))
    }
}
