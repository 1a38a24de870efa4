//! Object model build pipeline.
//!
//! [`Object`] - strong handle на shared cell. Cell создаётся в состоянии
//! "uninitialized shell" (только тип, без значения), регистрируется в
//! locator/lifetime container и лишь потом заполняется constructor'ом.
//! Благодаря этому singletons с циклическими зависимостями видят одну и ту же
//! cell ещё до завершения конструирования.
//!
//! [`WeakObject`] - non-owning handle, который хранит locator.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::errors::{BuildError, BuildResult};
use crate::keys::TypeKey;

pub type DynValue = Box<dyn Any + Send + Sync>;

/// Тип, владеющий ресурсами, которые освобождает lifetime container
pub trait Disposable {
    fn dispose(&mut self);
}

/// Тип, который хочет знать о завершении build up и начале tear down
pub trait BuilderAware {
    fn on_built_up(&mut self, id: Option<&str>);
    fn on_tearing_down(&mut self);
}

type DisposeFn = fn(&mut (dyn Any + Send + Sync));
type BuiltUpFn = fn(&mut (dyn Any + Send + Sync), Option<&str>);
type TearingDownFn = fn(&mut (dyn Any + Send + Sync));
type CloneFn = fn(&(dyn Any + Send + Sync)) -> Option<DynValue>;

/// Приведение `&T` к view `&U` (обычно `U = dyn Trait`) без знания `T`
pub(crate) trait ErasedCast<U: ?Sized>: Send + Sync {
    fn cast<'a>(&self, value: &'a (dyn Any + Send + Sync)) -> Option<&'a U>;
}

struct TypedCast<T, U: ?Sized> {
    view: fn(&T) -> &U,
}

impl<T, U> ErasedCast<U> for TypedCast<T, U>
where
    T: Any + Send + Sync,
    U: ?Sized + 'static,
{
    fn cast<'a>(&self, value: &'a (dyn Any + Send + Sync)) -> Option<&'a U> {
        value.downcast_ref::<T>().map(self.view)
    }
}

/// Capabilities конкретного типа: dispose, builder-aware hooks, clone и views.
///
/// Объявляются один раз в `TypeDescriptor` и прикрепляются к каждому
/// экземпляру, который аллоцирует или регистрирует pipeline.
#[derive(Default)]
pub struct Capabilities {
    disposer: Option<DisposeFn>,
    built_up: Option<BuiltUpFn>,
    tearing_down: Option<TearingDownFn>,
    cloner: Option<CloneFn>,
    views: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dispose<T: Disposable + Any + Send + Sync>(mut self) -> Self {
        self.disposer = Some(dispose_thunk::<T>);
        self
    }

    pub fn with_builder_aware<T: BuilderAware + Any + Send + Sync>(mut self) -> Self {
        self.built_up = Some(built_up_thunk::<T>);
        self.tearing_down = Some(tearing_down_thunk::<T>);
        self
    }

    pub fn with_clone<T: Clone + Any + Send + Sync>(mut self) -> Self {
        self.cloner = Some(clone_thunk::<T>);
        self
    }

    pub fn with_view<T, U>(mut self, view: fn(&T) -> &U) -> Self
    where
        T: Any + Send + Sync,
        U: ?Sized + 'static,
    {
        let caster: Arc<dyn ErasedCast<U>> = Arc::new(TypedCast { view });
        self.views.insert(TypeId::of::<U>(), Arc::new(caster));
        self
    }

    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    pub fn is_builder_aware(&self) -> bool {
        self.built_up.is_some()
    }

    pub fn is_cloneable(&self) -> bool {
        self.cloner.is_some()
    }

    fn caster<U: ?Sized + 'static>(&self) -> Option<Arc<dyn ErasedCast<U>>> {
        self.views
            .get(&TypeId::of::<U>())
            .and_then(|erased| erased.downcast_ref::<Arc<dyn ErasedCast<U>>>())
            .cloned()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("disposable", &self.is_disposable())
            .field("builder_aware", &self.is_builder_aware())
            .field("cloneable", &self.is_cloneable())
            .field("views", &self.views.len())
            .finish()
    }
}

fn dispose_thunk<T: Disposable + Any>(value: &mut (dyn Any + Send + Sync)) {
    if let Some(value) = value.downcast_mut::<T>() {
        value.dispose();
    }
}

fn built_up_thunk<T: BuilderAware + Any>(value: &mut (dyn Any + Send + Sync), id: Option<&str>) {
    if let Some(value) = value.downcast_mut::<T>() {
        value.on_built_up(id);
    }
}

fn tearing_down_thunk<T: BuilderAware + Any>(value: &mut (dyn Any + Send + Sync)) {
    if let Some(value) = value.downcast_mut::<T>() {
        value.on_tearing_down();
    }
}

fn clone_thunk<T: Clone + Any + Send + Sync>(value: &(dyn Any + Send + Sync)) -> Option<DynValue> {
    value
        .downcast_ref::<T>()
        .map(|value| Box::new(value.clone()) as DynValue)
}

struct ObjectCell {
    type_key: TypeKey,
    value: RwLock<Option<DynValue>>,
    capabilities: OnceCell<Arc<Capabilities>>,
}

/// Strong handle на построенный (или строящийся) объект
#[derive(Clone)]
pub struct Object {
    cell: Arc<ObjectCell>,
}

impl Object {
    /// Обернуть готовое значение
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            cell: Arc::new(ObjectCell {
                type_key: TypeKey::of::<T>(),
                value: RwLock::new(Some(Box::new(value))),
                capabilities: OnceCell::new(),
            }),
        }
    }

    /// Shell без значения; заполняется через constructor позже
    pub fn uninitialized(type_key: TypeKey) -> Self {
        Self {
            cell: Arc::new(ObjectCell {
                type_key,
                value: RwLock::new(None),
                capabilities: OnceCell::new(),
            }),
        }
    }

    pub(crate) fn from_boxed(type_key: TypeKey, value: DynValue) -> BuildResult<Self> {
        let object = Self::uninitialized(type_key);
        object.initialize(value)?;
        Ok(object)
    }

    /// Конкретный runtime тип объекта
    pub fn type_key(&self) -> TypeKey {
        self.cell.type_key
    }

    pub fn is<T: Any>(&self) -> bool {
        self.cell.type_key.type_id() == TypeId::of::<T>()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.value.read().is_some()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            cell: Arc::downgrade(&self.cell),
        }
    }

    pub fn capabilities(&self) -> Option<&Arc<Capabilities>> {
        self.cell.capabilities.get()
    }

    /// Прикрепляет capabilities один раз; повторный вызов ничего не меняет
    pub(crate) fn attach_capabilities(&self, capabilities: Arc<Capabilities>) {
        let _ = self.cell.capabilities.set(capabilities);
    }

    /// Construct-in-place: положить значение в ранее выделенный shell
    pub(crate) fn initialize(&self, value: DynValue) -> BuildResult<()> {
        if (*value).type_id() != self.cell.type_key.type_id() {
            return Err(BuildError::incompatible_types(
                self.cell.type_key.name(),
                "value produced by constructor",
                self.cell.type_key.name(),
            ));
        }
        *self.cell.value.write() = Some(value);
        Ok(())
    }

    pub fn read<T: Any>(&self) -> Option<MappedRwLockReadGuard<'_, T>> {
        let guard = self.cell.value.read();
        RwLockReadGuard::try_map(guard, |slot| {
            slot.as_deref().and_then(|value| value.downcast_ref::<T>())
        })
        .ok()
    }

    pub fn write<T: Any>(&self) -> Option<MappedRwLockWriteGuard<'_, T>> {
        let guard = self.cell.value.write();
        RwLockWriteGuard::try_map(guard, |slot| {
            slot.as_deref_mut().and_then(|value| value.downcast_mut::<T>())
        })
        .ok()
    }

    /// Копия значения для `Clone` типов (primitives, strings, configs)
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.read::<T>().map(|value| value.clone())
    }

    /// View через объявленный trait object: `object.read_as::<dyn Greeter>()`
    pub fn read_as<U: ?Sized + 'static>(&self) -> Option<MappedRwLockReadGuard<'_, U>> {
        let caster = self.capabilities()?.caster::<U>()?;
        let guard = self.cell.value.read();
        RwLockReadGuard::try_map(guard, move |slot| {
            slot.as_deref().and_then(|value| caster.cast(value))
        })
        .ok()
    }

    pub(crate) fn with_value_mut<R>(
        &self,
        f: impl FnOnce(&mut (dyn Any + Send + Sync)) -> R,
    ) -> BuildResult<R> {
        let mut guard = self.cell.value.write();
        match guard.as_deref_mut() {
            Some(value) => Ok(f(value)),
            None => Err(BuildError::UninitializedObject {
                type_name: self.cell.type_key.name().to_string(),
            }),
        }
    }

    /// Освободить ресурсы объекта, если тип объявлен как Disposable
    pub fn dispose(&self) -> bool {
        let Some(disposer) = self.capabilities().and_then(|caps| caps.disposer) else {
            return false;
        };
        let mut guard = self.cell.value.write();
        match guard.as_deref_mut() {
            Some(value) => {
                disposer(value);
                true
            }
            None => false,
        }
    }

    pub(crate) fn notify_built_up(&self, id: Option<&str>) -> BuildResult<bool> {
        match self.capabilities().and_then(|caps| caps.built_up) {
            Some(hook) => self.with_value_mut(|value| hook(value, id)).map(|_| true),
            None => Ok(false),
        }
    }

    pub(crate) fn notify_tearing_down(&self) -> BuildResult<bool> {
        match self.capabilities().and_then(|caps| caps.tearing_down) {
            Some(hook) => self.with_value_mut(hook).map(|_| true),
            None => Ok(false),
        }
    }

    /// Глубокая копия для cloneable типов; `None`, если тип не объявлен как Clone
    pub fn try_clone_value(&self) -> Option<Object> {
        let caps = self.capabilities()?.clone();
        let cloner = caps.cloner?;
        let copy = {
            let guard = self.cell.value.read();
            cloner(guard.as_deref()?)?
        };
        let object = Object::from_boxed(self.cell.type_key, copy).ok()?;
        object.attach_capabilities(caps);
        Some(object)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.cell.type_key.name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Non-owning handle; не продлевает жизнь объекта
#[derive(Clone)]
pub struct WeakObject {
    cell: Weak<ObjectCell>,
}

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.cell.upgrade().map(|cell| Object { cell })
    }

    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObject(alive: {})", self.is_alive())
    }
}
