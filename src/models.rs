use {
    chrono::{DateTime, Utc},
    mongodb::{
        IndexModel,
        bson::{Bson, Document, doc},
        options::IndexOptions,
    },
    serde::{Deserialize, Serialize, Serializer},
    std::fmt,
};

pub const DEFAULT_DATABASE: &str = "test_db";
pub const DEFAULT_USERNAME: &str = "test";
pub const DEFAULT_PASSWORD: &str = "test";
pub const DEFAULT_ROLE: &str = "readWrite";
pub const DEFAULT_COLLECTION: &str = "reps";
pub const DEFAULT_INDEX_FIELD: &str = "address";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

impl RoleGrant {
    pub fn read_write(db: &str) -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            db: db.to_string(),
        }
    }

    pub fn to_document(&self) -> Document {
        doc! { "role": &self.role, "db": &self.db }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct UserSpec {
    pub username: String,
    pub password: String,
    pub roles: Vec<RoleGrant>,
}

impl UserSpec {
    /// The `createUser` command issued against the user's database.
    pub fn create_command(&self) -> Document {
        let roles: Vec<Bson> = self
            .roles
            .iter()
            .map(|grant| Bson::Document(grant.to_document()))
            .collect();

        doc! {
            "createUser": &self.username,
            "pwd": &self.password,
            "roles": roles,
        }
    }
}

impl Serialize for UserSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Masked<'a> {
            username: &'a str,
            password: &'static str,
            roles: &'a [RoleGrant],
        }

        Masked {
            username: &self.username,
            password: "***",
            roles: &self.roles,
        }
        .serialize(serializer)
    }
}

impl fmt::Debug for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSpec")
            .field("username", &self.username)
            .field("password", &"***")
            .field("roles", &self.roles)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    Ascending,
    Descending,
    Text,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Ascending => "ascending",
            IndexKind::Descending => "descending",
            IndexKind::Text => "text",
        };
        f.write_str(name)
    }
}

impl IndexKind {
    pub fn key_value(self) -> Bson {
        match self {
            IndexKind::Ascending => Bson::Int32(1),
            IndexKind::Descending => Bson::Int32(-1),
            IndexKind::Text => Bson::String("text".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub collection: String,
    pub field: String,
    pub kind: IndexKind,
    pub unique: bool,
}

impl IndexSpec {
    pub fn keys(&self) -> Document {
        let mut keys = Document::new();
        keys.insert(self.field.clone(), self.kind.key_value());
        keys
    }

    pub fn to_index_model(&self) -> IndexModel {
        IndexModel::builder()
            .keys(self.keys())
            .options(IndexOptions::builder().unique(self.unique).build())
            .build()
    }
}

/// Everything the bootstrap procedure creates, all scoped to one database.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub database: String,
    pub user: UserSpec,
    pub collection: String,
    pub index: IndexSpec,
}

impl Default for BootstrapPlan {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            user: UserSpec {
                username: DEFAULT_USERNAME.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
                roles: vec![RoleGrant::read_write(DEFAULT_DATABASE)],
            },
            collection: DEFAULT_COLLECTION.to_string(),
            index: IndexSpec {
                collection: DEFAULT_COLLECTION.to_string(),
                field: DEFAULT_INDEX_FIELD.to_string(),
                kind: IndexKind::Text,
                unique: true,
            },
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateUser,
    CreateCollection,
    CreateIndex,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::CreateUser, Step::CreateCollection, Step::CreateIndex];

    pub fn describe(self, plan: &BootstrapPlan) -> String {
        match self {
            Step::CreateUser => {
                let roles: Vec<String> = plan
                    .user
                    .roles
                    .iter()
                    .map(|grant| format!("{}@{}", grant.role, grant.db))
                    .collect();
                format!(
                    "create user {} on {} with roles [{}]",
                    plan.user.username,
                    plan.database,
                    roles.join(", ")
                )
            }
            Step::CreateCollection => {
                format!("create collection {}.{}", plan.database, plan.collection)
            }
            Step::CreateIndex => format!(
                "create {}{} index on {}.{}.{}",
                if plan.index.unique { "unique " } else { "" },
                plan.index.kind,
                plan.database,
                plan.index.collection,
                plan.index.field
            ),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateUser => "create_user",
            Step::CreateCollection => "create_collection",
            Step::CreateIndex => "create_index",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct BootstrapReport {
    pub database: String,
    pub steps_completed: Vec<Step>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_fixed_constants() {
        let plan = BootstrapPlan::default();
        assert_eq!(plan.database, "test_db");
        assert_eq!(plan.user.username, "test");
        assert_eq!(plan.user.password, "test");
        assert_eq!(
            plan.user.roles,
            vec![RoleGrant {
                role: "readWrite".to_string(),
                db: "test_db".to_string()
            }]
        );
        assert_eq!(plan.collection, "reps");
        assert_eq!(plan.index.collection, "reps");
        assert_eq!(plan.index.field, "address");
        assert_eq!(plan.index.kind, IndexKind::Text);
        assert!(plan.index.unique);
    }

    #[test]
    fn create_user_command_shape() {
        let command = BootstrapPlan::default().user.create_command();
        assert_eq!(
            command,
            doc! {
                "createUser": "test",
                "pwd": "test",
                "roles": [{ "role": "readWrite", "db": "test_db" }],
            }
        );
        assert_eq!(command.keys().next().map(String::as_str), Some("createUser"));
    }

    #[test]
    fn text_index_model() {
        let model = BootstrapPlan::default().index.to_index_model();
        assert_eq!(model.keys, doc! { "address": "text" });
        let unique = model.options.and_then(|options| options.unique);
        assert_eq!(unique, Some(true));
    }

    #[test]
    fn password_never_leaks() {
        let user = BootstrapPlan::default().user;
        let debug = format!("{user:?}");
        assert!(!debug.contains("password: \"test\""));
        assert!(debug.contains("password: \"***\""));

        let json = serde_json::to_value(&user).expect("serializable");
        assert_eq!(json["password"], "***");
        assert_eq!(json["username"], "test");
    }

    #[test]
    fn steps_describe_the_plan() {
        let plan = BootstrapPlan::default();
        let lines: Vec<String> = Step::ALL.iter().map(|s| s.describe(&plan)).collect();
        assert_eq!(
            lines,
            vec![
                "create user test on test_db with roles [readWrite@test_db]",
                "create collection test_db.reps",
                "create unique text index on test_db.reps.address",
            ]
        );
    }
}
