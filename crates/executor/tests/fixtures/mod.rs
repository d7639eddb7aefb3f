//! A small Star Wars model shared by the integration tests.

#![allow(dead_code, clippy::panic, clippy::new_without_default)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::StreamExt;
use graph_executor::{
    host::{HostObject, Shape, ShapeRef},
    Arguments, EventStream, ExecutorConfig, HostValue, IntoHostValue, Object, ObjectShapeBuilder, Registry,
    ResolverError, RootValue, Schema,
};
use indexmap::IndexMap;

pub const SDL: &str = r#"
schema {
  query: Query
  mutation: Mutation
  subscription: Subscription
}

"One of the films in the Star Wars Trilogy"
enum Episode {
  NEWHOPE
  EMPIRE
  JEDI
}

interface Character {
  id: ID!
  name: String!
  friends: [Character!]!
  appearsIn: [Episode!]!
}

type Human implements Character {
  id: ID!
  name: String!
  friends: [Character!]!
  appearsIn: [Episode!]!
  homePlanet: String
}

type Droid implements Character {
  id: ID!
  name: String!
  friends: [Character!]!
  appearsIn: [Episode!]!
  primaryFunction: String
}

union SearchResult = Human | Droid

type Product {
  id: ID!
  name: String!
  price: Float!
}

type Review {
  stars: Int!
  commentary: String
}

type Query {
  hero(episode: Episode): Character!
  human(id: ID!): Human
  droid(id: ID!): Droid
  search(text: String!): [SearchResult!]!
  product(id: ID!): Product!
  panicky: String
}

type NumberHolder {
  theNumber: Int!
  writes: [Int!]!
}

type Mutation {
  changeTheNumber(newNumber: Int!): NumberHolder!
}

type Subscription {
  reviews: Review
  endless: Review
}
"#;

pub struct Database {
    humans: IndexMap<&'static str, Arc<Human>>,
    droids: IndexMap<&'static str, Arc<Droid>>,
    products: IndexMap<&'static str, Arc<Product>>,
}

impl Database {
    pub fn new() -> Self {
        let human = |id, name, home_planet, friends| {
            (
                id,
                Arc::new(Human {
                    id,
                    name,
                    home_planet,
                    friends,
                    appears_in: vec!["NEWHOPE", "EMPIRE", "JEDI"],
                }),
            )
        };
        let droid = |id, name, primary_function, friends| {
            (
                id,
                Arc::new(Droid {
                    id,
                    name,
                    primary_function,
                    friends,
                    appears_in: vec!["NEWHOPE", "EMPIRE", "JEDI"],
                }),
            )
        };

        Database {
            humans: IndexMap::from([
                human("1000", "Luke Skywalker", Some("Tatooine"), vec!["1002", "1003", "2000", "2001"]),
                human("1002", "Han Solo", None, vec!["1000", "1003", "2001"]),
                human("1003", "Leia Organa", Some("Alderaan"), vec!["1000", "1002", "2000", "2001"]),
            ]),
            droids: IndexMap::from([
                droid("2000", "C-3PO", "Protocol", vec!["1000", "1002", "1003", "2001"]),
                droid("2001", "R2-D2", "Astromech", vec!["1000", "1002", "1003"]),
            ]),
            products: IndexMap::from([(
                "1001",
                Arc::new(Product {
                    id: "1001",
                    name: "Lightsaber",
                    price: 199.5,
                }),
            )]),
        }
    }

    pub fn character(&self, id: &str) -> Option<Character> {
        self.humans
            .get(id)
            .cloned()
            .map(Character::Human)
            .or_else(|| self.droids.get(id).cloned().map(Character::Droid))
    }

    fn characters(&self, ids: &[&str]) -> Vec<Character> {
        ids.iter().filter_map(|id| self.character(id)).collect()
    }
}

pub enum Character {
    Human(Arc<Human>),
    Droid(Arc<Droid>),
}

impl IntoHostValue for Character {
    fn shape() -> Shape {
        Shape::OneOf(vec![ShapeRef::of::<Human>(), ShapeRef::of::<Droid>()])
    }

    fn into_host_value(self) -> HostValue {
        match self {
            Character::Human(human) => HostValue::Object(HostObject::new(human)),
            Character::Droid(droid) => HostValue::Object(HostObject::new(droid)),
        }
    }
}

pub struct Human {
    id: &'static str,
    name: &'static str,
    home_planet: Option<&'static str>,
    friends: Vec<&'static str>,
    appears_in: Vec<&'static str>,
}

impl Object for Human {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .field("id", |human| human.id)
            .field("name", |human| human.name)
            .field("home_planet", |human| human.home_planet)
            .field("appears_in", |human| human.appears_in.clone())
            .async_method("friends", |human, ctx| async move {
                Ok(ctx.data::<Database>()?.characters(&human.friends))
            });
    }
}

pub struct Droid {
    id: &'static str,
    name: &'static str,
    primary_function: &'static str,
    friends: Vec<&'static str>,
    appears_in: Vec<&'static str>,
}

impl Object for Droid {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .field("id", |droid| droid.id)
            .field("name", |droid| droid.name)
            .field("primaryFunction", |droid| Some(droid.primary_function))
            .field("appearsIn", |droid| droid.appears_in.clone())
            .async_method("friends", |droid, ctx| async move {
                Ok(ctx.data::<Database>()?.characters(&droid.friends))
            });
    }
}

pub struct Product {
    id: &'static str,
    name: &'static str,
    price: f64,
}

impl Object for Product {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .field("id", |product| product.id)
            .field("name", |product| product.name)
            .field("price", |product| product.price);
    }
}

#[derive(Default)]
pub struct Query;

impl Object for Query {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .async_method_with_args("hero", |_, ctx, arguments: Arguments| async move {
                let database = ctx.data::<Database>()?;
                let id = match arguments.get_as::<Option<String>>("episode")?.as_deref() {
                    Some("EMPIRE") => "1000",
                    _ => "2001",
                };
                database
                    .character(id)
                    .ok_or_else(|| ResolverError::new("hero missing"))
            })
            .async_method_with_args("human", |_, ctx, arguments: Arguments| async move {
                let id = arguments.get_as::<String>("id")?;
                Ok(ctx.data::<Database>()?.humans.get(id.as_str()).cloned())
            })
            .async_method_with_args("droid", |_, ctx, arguments: Arguments| async move {
                let id = arguments.get_as::<String>("id")?;
                Ok(ctx.data::<Database>()?.droids.get(id.as_str()).cloned())
            })
            .async_method_with_args("search", |_, ctx, arguments: Arguments| async move {
                let text = arguments.get_as::<String>("text")?.to_lowercase();
                let database = ctx.data::<Database>()?;
                let humans = database.humans.values().cloned().map(Character::Human);
                let droids = database.droids.values().cloned().map(Character::Droid);
                Ok(humans
                    .chain(droids)
                    .filter(|character| match character {
                        Character::Human(human) => human.name.to_lowercase().contains(&text),
                        Character::Droid(droid) => droid.name.to_lowercase().contains(&text),
                    })
                    .collect::<Vec<_>>())
            })
            .async_method_with_args("product", |_, ctx, arguments: Arguments| async move {
                let id = arguments.get_as::<String>("id")?;
                ctx.data::<Database>()?
                    .products
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| {
                        ResolverError::new("error [NotFound]: Product not found.").with_extension("code", "NotFound")
                    })
            })
            .method("panicky", |_| -> Option<String> { panic!("boom") });
    }
}

pub struct NumberHolder {
    the_number: i32,
    writes: Vec<i32>,
}

impl Object for NumberHolder {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .field("the_number", |holder| holder.the_number)
            .field("writes", |holder| holder.writes.clone());
    }
}

/// Later calls finish faster, so running them concurrently would reorder
/// the writes.
#[derive(Default)]
pub struct Mutation {
    writes: Arc<Mutex<Vec<i32>>>,
}

impl Object for Mutation {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape.async_method_with_args("change_the_number", |mutation, _, arguments: Arguments| async move {
            let new_number = arguments.get_as::<i32>("newNumber")?;
            let delay = 4 - u64::try_from(new_number.clamp(0, 4))?;
            tokio::time::sleep(Duration::from_millis(20 * delay)).await;

            let mut writes = mutation.writes.lock().unwrap();
            writes.push(new_number);
            Ok(Arc::new(NumberHolder {
                the_number: new_number,
                writes: writes.clone(),
            }))
        });
    }
}

pub struct Review {
    stars: i32,
    commentary: Option<&'static str>,
}

impl Review {
    pub fn new(stars: i32) -> Arc<Self> {
        Arc::new(Review { stars, commentary: None })
    }
}

impl Object for Review {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape.field("stars", |review| review.stars).async_method("commentary", |review, _| async move {
            // Zero-star reviews take a while to write.
            if review.stars == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(review.commentary)
        });
    }
}

#[derive(Default)]
pub struct Subscription;

impl Object for Subscription {
    fn describe(shape: &mut ObjectShapeBuilder<Self>) {
        shape
            .method("reviews", |_| {
                EventStream::new(futures::stream::iter([
                    Ok(Review::new(5)),
                    Err(ResolverError::new("Review feed interrupted")),
                    Ok(Review::new(3)),
                ]))
            })
            .method("endless", |_| {
                EventStream::new(
                    futures::stream::iter([Ok(Review::new(0)), Ok(Review::new(4))]).chain(futures::stream::pending()),
                )
            });
    }
}

pub fn registry() -> Registry {
    Registry::from_sdl(SDL).unwrap()
}

pub fn root() -> RootValue {
    RootValue::new(Query)
        .mutation(Mutation::default())
        .subscription(Subscription)
}

pub fn schema() -> Schema {
    schema_with_config(ExecutorConfig::default())
}

pub fn schema_with_config(config: ExecutorConfig) -> Schema {
    Schema::build(registry(), root())
        .config(config)
        .data(Database::new())
        .finish()
        .unwrap()
}
