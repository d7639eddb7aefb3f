#![allow(unused_crate_dependencies, clippy::panic)]

mod fixtures;

use std::time::Duration;

use futures::StreamExt;
use graph_executor::{ErrorCode, ExecutorConfig, Request};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn one_response_per_event() {
    let responses = fixtures::schema()
        .subscribe("subscription { reviews { stars } }")
        .collect::<Vec<_>>()
        .await;

    insta::assert_json_snapshot!(responses, @r###"
    [
      {
        "data": {
          "reviews": {
            "stars": 5
          }
        }
      },
      {
        "errors": [
          {
            "message": "Review feed interrupted",
            "locations": [
              {
                "line": 1,
                "column": 16
              }
            ],
            "path": [
              "reviews"
            ],
            "extensions": {
              "code": "RESOLVER_ERROR"
            }
          }
        ],
        "data": {
          "reviews": null
        }
      },
      {
        "data": {
          "reviews": {
            "stars": 3
          }
        }
      }
    ]
    "###);
}

#[tokio::test]
async fn slow_events_time_out_and_the_stream_goes_on() {
    let schema = fixtures::schema_with_config(ExecutorConfig {
        subscription_event_timeout: Duration::from_millis(100),
        ..Default::default()
    });
    let cancellation = CancellationToken::new();

    let mut stream = schema.subscribe(
        Request::new("subscription { endless { stars commentary } }").cancellation(cancellation.clone()),
    );

    let timed_out = stream.next().await.unwrap();
    assert_eq!(timed_out.errors.len(), 1);
    assert_eq!(timed_out.errors[0].code, ErrorCode::OperationTimeout);

    let next = stream.next().await.unwrap();
    insta::assert_json_snapshot!(next, @r###"
    {
      "data": {
        "endless": {
          "stars": 4,
          "commentary": null
        }
      }
    }
    "###);

    cancellation.cancel();
    let end = tokio::time::timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert!(end.is_none());
}

#[tokio::test]
async fn queries_produce_a_single_response() {
    let responses = fixtures::schema()
        .subscribe(r#"{ droid(id: "2001") { name } }"#)
        .collect::<Vec<_>>()
        .await;

    insta::assert_json_snapshot!(responses, @r###"
    [
      {
        "data": {
          "droid": {
            "name": "R2-D2"
          }
        }
      }
    ]
    "###);
}

#[tokio::test]
async fn subscriptions_select_a_single_root_field() {
    let responses = fixtures::schema()
        .subscribe("subscription { reviews { stars } endless { stars } }")
        .collect::<Vec<_>>()
        .await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0].data.is_none());
    assert_eq!(
        responses[0].errors[0].message,
        "Subscription operations must select exactly one top level field, found 2."
    );
}

#[tokio::test]
async fn cancelled_before_the_first_event() {
    let cancellation = CancellationToken::new();
    cancellation.cancel();

    let responses = fixtures::schema()
        .subscribe(Request::new("subscription { reviews { stars } }").cancellation(cancellation))
        .collect::<Vec<_>>()
        .await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0].data.is_none());
    assert_eq!(responses[0].errors[0].code, ErrorCode::OperationCancelled);
}

#[tokio::test]
async fn dropping_the_stream_mid_event_leaves_the_caller_token_alone() {
    let cancellation = CancellationToken::new();
    let mut stream = fixtures::schema()
        .subscribe(Request::new("subscription { endless { stars commentary } }").cancellation(cancellation.clone()));

    // The first review takes seconds to complete.
    let first = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(first.is_err());
    drop(stream);

    assert!(!cancellation.is_cancelled());
}
