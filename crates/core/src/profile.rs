use serde::Serialize;

/// A single profiled function, immutable once constructed.
///
/// Descriptors are created only through [`Profile::add_function`] and owned
/// exclusively by the profile's descriptor list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Demangled or raw function name, never empty.
    name: String,
    /// Object/binary the function was defined in. Empty when no `ob=` record
    /// preceded the defining `fn=` record.
    #[serde(skip_serializing_if = "String::is_empty")]
    object: String,
    /// Source file the function was defined in. Reserved for `fl=`/`fi=`
    /// record support; currently always empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    file: String,
}

impl FunctionDescriptor {
    /// Construct a descriptor.
    ///
    /// Panics if `name` is empty; the parser filters empty names out before
    /// they reach the model.
    pub(crate) fn new(name: String, object: String, file: String) -> Self {
        assert!(!name.is_empty(), "function name must be non-empty");
        Self { name, object, file }
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The defining object/binary name, possibly empty.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// The defining source file, possibly empty (reserved).
    pub fn file(&self) -> &str {
        &self.file
    }
}

/// The result of parsing one Callgrind file: the profiled command plus an
/// ordered, append-only list of function descriptors.
///
/// Insertion order matches the order of `fn=` records in the input, which is
/// meaningful for display.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Profile {
    command: String,
    functions: Vec<FunctionDescriptor>,
}

impl Profile {
    /// Create an empty profile with no command set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The profiled command line, empty until [`set_command`](Self::set_command)
    /// is called.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Set the profiled command. Called at most once per parse session, from
    /// the `cmd:` header line.
    pub fn set_command(&mut self, command: impl Into<String>) {
        debug_assert!(self.command.is_empty(), "command is set at most once");
        self.command = command.into();
    }

    /// A profile is valid iff a `cmd:` header line supplied its command.
    pub fn is_valid(&self) -> bool {
        !self.command.is_empty()
    }

    /// Append a descriptor for `name` defined in `object` and return a
    /// reference to it, valid for the profile's lifetime. Descriptors are
    /// never removed.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        object: impl Into<String>,
    ) -> &FunctionDescriptor {
        self.functions
            .push(FunctionDescriptor::new(name.into(), object.into(), String::new()));
        self.functions.last().expect("descriptor was just appended")
    }

    /// The descriptors in insertion order.
    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// Number of descriptors.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_is_invalid() {
        let p = Profile::new();
        assert!(!p.is_valid());
        assert_eq!(p.command(), "");
        assert_eq!(p.function_count(), 0);
    }

    #[test]
    fn set_command_makes_valid() {
        let mut p = Profile::new();
        p.set_command("/bin/ls");
        assert!(p.is_valid());
        assert_eq!(p.command(), "/bin/ls");
    }

    #[test]
    fn add_function_preserves_order() {
        let mut p = Profile::new();
        p.add_function("main", "a.out");
        p.add_function("helper", "");
        let names: Vec<&str> = p.functions().iter().map(FunctionDescriptor::name).collect();
        assert_eq!(names, vec!["main", "helper"]);
        assert_eq!(p.functions()[0].object(), "a.out");
        assert_eq!(p.functions()[1].object(), "");
    }

    #[test]
    fn add_function_returns_appended_descriptor() {
        let mut p = Profile::new();
        let d = p.add_function("main", "a.out");
        assert_eq!(d.name(), "main");
        assert_eq!(d.file(), "");
    }

    #[test]
    #[should_panic(expected = "function name must be non-empty")]
    fn empty_name_panics() {
        let mut p = Profile::new();
        p.add_function("", "a.out");
    }
}
