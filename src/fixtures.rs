#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use crate::error::ConfigError;
    use crate::schema::{Configurable, Schema};

    #[derive(Debug, Default, PartialEq)]
    pub struct DatabaseConfig {
        pub host: String,
        pub port: u16,
        pub user: String,
    }

    impl Configurable for DatabaseConfig {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
            schema.field("Host", "host;default=localhost", &mut self.host)?;
            schema.field("Port", "port;default=5432", &mut self.port)?;
            schema.field(
                "User",
                "user;required;description=Database user",
                &mut self.user,
            )?;
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct AppConfig {
        pub name: String,
        pub database: DatabaseConfig,
        pub debug: bool,
        pub hero_names: Vec<String>,
        pub timeout: Duration,
        pub color: String,
        pub replica: Option<Box<DatabaseConfig>>,
    }

    impl Configurable for AppConfig {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
            schema.field("Name", "name;default=flagenv", &mut self.name)?;
            schema.nested("Database", &mut self.database)?;
            schema.field(
                "Debug",
                "debug;short=d;description=Enable debug output",
                &mut self.debug,
            )?;
            schema.field(
                "HeroNames",
                "hero-names;default=Deadpool,Iron Man,Dr. Strange",
                &mut self.hero_names,
            )?;
            schema.field("Timeout", "timeout;default=1s", &mut self.timeout)?;
            schema.field(
                "Color",
                "color;default=red;options=red,blue",
                &mut self.color,
            )?;
            schema.nested("Replica", &mut self.replica)?;
            Ok(())
        }
    }

    /// Only `kept` takes part in resolution: `ignored` has an empty tag and
    /// `internal` is never registered.
    #[derive(Debug, Default, PartialEq)]
    pub struct Skipping {
        pub kept: String,
        pub ignored: String,
        pub internal: u32,
    }

    impl Configurable for Skipping {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
            schema.field("Kept", "kept", &mut self.kept)?;
            schema.field("Ignored", "", &mut self.ignored)?;
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    pub struct Nested {
        pub int: i64,
        pub string: String,
    }

    impl Configurable for Nested {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
            schema.field("Int", "int", &mut self.int)?;
            schema.field("String", "string", &mut self.string)?;
            Ok(())
        }
    }

    /// One field of every supported kind.
    #[derive(Debug, Default, PartialEq)]
    pub struct Scalars {
        pub boolean: bool,
        pub int: isize,
        pub int_slice: Vec<isize>,
        pub int8: i8,
        pub int16: i16,
        pub int32: i32,
        pub int64: i64,
        pub uint: usize,
        pub uint8: u8,
        pub uint16: u16,
        pub uint32: u32,
        pub uint64: u64,
        pub float32: f32,
        pub float64: f64,
        pub string: String,
        pub duration: Duration,
        pub nested: Nested,
        pub nested_absent: Option<Nested>,
        pub nested_present: Option<Box<Nested>>,
    }

    impl Configurable for Scalars {
        fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
            schema.field(
                "Bool",
                "bool;short=b;description=Boolean for testing",
                &mut self.boolean,
            )?;
            schema.field("Int", "int", &mut self.int)?;
            schema.field("IntSlice", "int-slice", &mut self.int_slice)?;
            schema.field("Int8", "int8", &mut self.int8)?;
            schema.field("Int16", "int16", &mut self.int16)?;
            schema.field("Int32", "int32", &mut self.int32)?;
            schema.field("Int64", "int64", &mut self.int64)?;
            schema.field("Uint", "uint", &mut self.uint)?;
            schema.field("Uint8", "uint8", &mut self.uint8)?;
            schema.field("Uint16", "uint16", &mut self.uint16)?;
            schema.field("Uint32", "uint32", &mut self.uint32)?;
            schema.field("Uint64", "uint64", &mut self.uint64)?;
            schema.field("Float32", "float32", &mut self.float32)?;
            schema.field("Float64", "float64", &mut self.float64)?;
            schema.field("String", "string", &mut self.string)?;
            schema.field("Duration", "duration", &mut self.duration)?;
            schema.nested("Struct", &mut self.nested)?;
            schema.nested("StructPtrNil", &mut self.nested_absent)?;
            schema.nested("StructPtrNotNil", &mut self.nested_present)?;
            Ok(())
        }
    }

    #[test]
    fn app_config_extracts_cleanly() {
        let mut config = AppConfig::default();
        let mut schema = Schema::root();
        config.describe(&mut schema).unwrap();
        assert_eq!(schema.fields().len(), 8);
    }
}
