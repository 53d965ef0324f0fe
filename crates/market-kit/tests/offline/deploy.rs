//! Contract deployment from build artifacts.

use std::io::Write;

use alloy_sol_types::SolValue;
use market_kit::*;
use serde_json::json;

use crate::mock_node::{MockNode, address, hex_bytes};

fn artifact_json(bytecode: &str) -> String {
    json!({
        "contractName": "Marketplace",
        "abi": [],
        "bytecode": bytecode,
        "networks": {}
    })
    .to_string()
}

#[tokio::test]
async fn test_deploy_from_first_node_account() {
    let node = MockNode::start().await;
    let deployer = Address::repeat_byte(0xd0);
    let created = Address::repeat_byte(0xee);
    node.accounts(&[deployer, Address::repeat_byte(0xd1)]);
    node.mine(1, Some(created));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(artifact_json("0x60806040").as_bytes()).unwrap();
    let artifact = Artifact::from_file(file.path()).unwrap();

    let eth = node.eth().build();
    let deployment = eth.deploy(&artifact).await.unwrap();

    assert_eq!(deployment.address, created);
    assert_eq!(deployment.receipt.contract_address, Some(created));
    assert_eq!(eth.account(), Some(deployer));

    let tx = &node.calls("eth_sendTransaction")[0][0];
    assert!(tx.get("to").is_none());
    assert_eq!(address(&tx["from"]), deployer);
    assert_eq!(
        tx["gas"].as_str().unwrap().parse::<U256>().unwrap(),
        U256::from(DEFAULT_DEPLOY_GAS)
    );
    assert_eq!(hex_bytes(&tx["data"]), vec![0x60, 0x80, 0x60, 0x40]);
}

#[tokio::test]
async fn test_deploy_with_constructor_args() {
    let node = MockNode::start().await;
    node.mine(1, Some(Address::repeat_byte(0xee)));

    let artifact = Artifact::from_json(&artifact_json("0x6080")).unwrap();
    let eth = node.eth().build();
    let old_market = Address::repeat_byte(0x01);

    eth.deploy(&artifact)
        .args((old_market,))
        .from(Address::repeat_byte(0xd0))
        .gas(3_000_000)
        .await
        .unwrap();

    let tx = &node.calls("eth_sendTransaction")[0][0];
    let mut expected = vec![0x60, 0x80];
    expected.extend((old_market,).abi_encode_params());
    assert_eq!(hex_bytes(&tx["data"]), expected);
    assert_eq!(tx["gas"], json!("0x2dc6c0"));

    // An explicit sender needs no account lookup
    assert!(node.calls("eth_accounts").is_empty());
}

#[tokio::test]
async fn test_deploy_requires_bytecode() {
    let node = MockNode::start().await;
    let artifact = Artifact::from_json(&artifact_json("0x")).unwrap();

    let err = node.eth().build().deploy(&artifact).await.unwrap_err();
    assert!(
        matches!(err, Error::Artifact(ArtifactError::MissingBytecode(ref name)) if name == "Marketplace"),
        "unexpected error: {err:?}"
    );
    assert!(node.methods().is_empty());
}

#[tokio::test]
async fn test_deploy_without_contract_address() {
    let node = MockNode::start().await;
    node.mine(1, None);

    let artifact = Artifact::from_json(&artifact_json("0x6080")).unwrap();
    let eth = node.eth().account(Address::repeat_byte(0xd0)).build();
    let err = eth.deploy(&artifact).await.unwrap_err();
    assert!(matches!(err, Error::NoContractAddress(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_deploy_without_accounts() {
    let node = MockNode::start().await;
    node.accounts(&[]);

    let artifact = Artifact::from_json(&artifact_json("0x6080")).unwrap();
    let err = node.eth().build().deploy(&artifact).await.unwrap_err();
    assert!(matches!(err, Error::NoAccount));
    assert!(node.calls("eth_sendTransaction").is_empty());
}
