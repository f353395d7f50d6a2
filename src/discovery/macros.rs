//! Declarative glue wiring descriptor structs into the discovery traits

/// Implement [`Discovery`](crate::discovery::Discovery) for a descriptor with a
/// flattened `base: EntityBase` field.
///
/// `requires = [..]` lists `Option` topic fields the kind cannot work without;
/// [`Discovery::validate`](crate::discovery::Discovery::validate) rejects the
/// descriptor while any of them is unset.
macro_rules! impl_discovery {
    ($ty:ident, $component:literal $(, requires = [$($field:ident),+ $(,)?])?) => {
        impl $ty {
            /// Component kind this descriptor is published under
            pub const COMPONENT: &'static str = $component;
        }

        impl $crate::discovery::Discovery for $ty {
            fn component(&self) -> &'static str {
                $component
            }

            fn base(&self) -> &$crate::discovery::EntityBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::discovery::EntityBase {
                &mut self.base
            }

            fn validate(&self) -> Result<(), $crate::discovery::DiscoveryError> {
                $($(
                    if self.$field.is_none() {
                        return Err($crate::discovery::DiscoveryError::MissingTopic {
                            component: $component,
                            unique_id: self.base.unique_id.clone(),
                            field: stringify!($field),
                        });
                    }
                )+)?
                Ok(())
            }

            fn to_json(&self) -> Result<String, $crate::discovery::DiscoveryError> {
                Ok(serde_json::to_string(self)?)
            }
        }
    };
}

/// Getter and setter for an `Option<String>` field named `state_topic`
macro_rules! impl_state_topic {
    ($ty:ident) => {
        impl $crate::discovery::StateTopicGetter for $ty {
            fn state_topic(&self) -> Option<&str> {
                self.state_topic.as_deref()
            }
        }

        impl $crate::discovery::StateTopicSetter for $ty {
            fn set_state_topic(&mut self, topic: String) {
                self.state_topic = Some(topic);
            }
        }
    };
}

/// Getter and setter for an `Option<String>` field named `command_topic`
macro_rules! impl_command_topic {
    ($ty:ident) => {
        impl $crate::discovery::CommandTopicGetter for $ty {
            fn command_topic(&self) -> Option<&str> {
                self.command_topic.as_deref()
            }
        }

        impl $crate::discovery::CommandTopicSetter for $ty {
            fn set_command_topic(&mut self, topic: String) {
                self.command_topic = Some(topic);
            }
        }
    };
}
