use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity типа: `TypeId` + читаемое имя для диагностики.
///
/// Работает и для unsized abstractions (`TypeKey::of::<dyn Service>()`),
/// поэтому type mapping может отображать trait object на конкретный тип.
/// Равенство и hash учитывают только `TypeId`.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Имя без module path: `my_app::services::Repo` -> `Repo`
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    // generic аргументы не режем, только путь до первого `<`
    let head = name.split('<').next().unwrap_or(name);
    match head.rfind("::") {
        Some(pos) => &name[pos + 2..],
        None => name,
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Ключ построения: тип + необязательный id (именованная регистрация)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildKey {
    pub type_key: TypeKey,
    pub id: Option<String>,
}

impl BuildKey {
    pub fn new(type_key: TypeKey, id: Option<&str>) -> Self {
        Self {
            type_key,
            id: id.map(str::to_string),
        }
    }

    pub fn of<T: ?Sized + 'static>(id: Option<&str>) -> Self {
        Self::new(TypeKey::of::<T>(), id)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl fmt::Display for BuildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}[{}]", self.type_key, id),
            None => write!(f, "{}", self.type_key),
        }
    }
}

/// Форматирование id для trace сообщений
pub(crate) fn display_id(id: Option<&str>) -> &str {
    id.unwrap_or("(null)")
}
