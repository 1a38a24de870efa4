use crate::errors::BuildResult;
use crate::keys::TypeKey;
use crate::object::Object;
use crate::strategy::{BuildContext, BuilderStrategy};

/// Уведомляет `BuilderAware` объекты о завершении build up и начале tear down
#[derive(Debug, Default)]
pub struct BuilderAwareStrategy;

impl BuilderStrategy for BuilderAwareStrategy {
    fn build_up(
        &self,
        context: &mut BuildContext,
        type_to_build: &TypeKey,
        existing: Option<Object>,
        id_to_build: Option<&str>,
    ) -> BuildResult<Option<Object>> {
        if let Some(object) = &existing {
            context.metadata().attach_capabilities(object);
            if object.capabilities().is_some_and(|caps| caps.is_builder_aware()) {
                self.trace_build_up(
                    context,
                    type_to_build,
                    id_to_build,
                    format_args!("Calling on_built_up"),
                );
                object.notify_built_up(id_to_build)?;
            }
        }
        context.build_next(type_to_build, existing, id_to_build)
    }

    fn tear_down(&self, context: &mut BuildContext, item: Object) -> BuildResult<Object> {
        context.metadata().attach_capabilities(&item);
        if item.capabilities().is_some_and(|caps| caps.is_builder_aware()) {
            self.trace_tear_down(context, &item, format_args!("Calling on_tearing_down"));
            item.notify_tearing_down()?;
        }
        context.tear_down_next(item)
    }
}
