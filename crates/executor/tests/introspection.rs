#![allow(unused_crate_dependencies, clippy::panic)]

mod fixtures;

use graph_executor::ExecutorConfig;

#[tokio::test]
async fn introspection_next_to_regular_fields() {
    let response = fixtures::schema()
        .execute(
            r#"
            {
              __schema {
                queryType { name }
                subscriptionType { name }
              }
              __type(name: "Droid") {
                kind
                name
                interfaces { name }
                fields {
                  name
                  type { kind name ofType { kind name } }
                }
              }
              droid(id: "2001") { name }
            }
            "#,
        )
        .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "__schema": {
          "queryType": {
            "name": "Query"
          },
          "subscriptionType": {
            "name": "Subscription"
          }
        },
        "__type": {
          "kind": "OBJECT",
          "name": "Droid",
          "interfaces": [
            {
              "name": "Character"
            }
          ],
          "fields": [
            {
              "name": "id",
              "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": {
                  "kind": "SCALAR",
                  "name": "ID"
                }
              }
            },
            {
              "name": "name",
              "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": {
                  "kind": "SCALAR",
                  "name": "String"
                }
              }
            },
            {
              "name": "friends",
              "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": {
                  "kind": "LIST",
                  "name": null
                }
              }
            },
            {
              "name": "appearsIn",
              "type": {
                "kind": "NON_NULL",
                "name": null,
                "ofType": {
                  "kind": "LIST",
                  "name": null
                }
              }
            },
            {
              "name": "primaryFunction",
              "type": {
                "kind": "SCALAR",
                "name": "String",
                "ofType": null
              }
            }
          ]
        },
        "droid": {
          "name": "R2-D2"
        }
      }
    }
    "###);
}

#[tokio::test]
async fn unknown_types_are_null() {
    let response = fixtures::schema().execute(r#"{ __type(name: "Wookiee") { name } }"#).await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "__type": null
      }
    }
    "###);
}

#[tokio::test]
async fn disabled_introspection() {
    let schema = fixtures::schema_with_config(ExecutorConfig {
        introspection: false,
        ..Default::default()
    });

    let response = schema.execute("{ __schema { queryType { name } } }").await;
    insta::assert_json_snapshot!(response, @r###"
    {
      "errors": [
        {
          "message": "Unauthorized for introspection.",
          "locations": [
            {
              "line": 1,
              "column": 3
            }
          ],
          "extensions": {
            "code": "UNAUTHORIZED"
          }
        }
      ]
    }
    "###);

    let response = schema.execute("{ __typename }").await;
    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "__typename": "Query"
      }
    }
    "###);
}
