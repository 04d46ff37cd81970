mod test_helpers;

use blockchain::chain::Chain;
use blockchain::constants::{MINING_DIFFICULTY, MINING_REWARD};
use blockchain::model::{Block, Transaction, TransactionStatus};
use test_helpers::{signed_transaction, temp_node, test_identity};

#[tokio::test]
async fn fresh_node_holds_only_genesis() {
    let (node, _dir) = temp_node("http://node-a");
    let blocks = node.blocks().await;
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].block_number, 0);
}

#[tokio::test]
async fn mining_one_reward_block_credits_the_miner() {
    let (node, _dir) = temp_node("http://node-a");
    let tip = node.blocks().await.into_iter().next_back().unwrap();
    let mut block = Block::new(tip.hash(), 0, tip.block_number + 1);
    block
        .add_transaction(Transaction::new_coinbase("knirvchainMiner".into(), MINING_REWARD))
        .unwrap();
    block.mine(MINING_DIFFICULTY);

    node.append_block(block).await.unwrap();

    assert_eq!(node.balance("knirvchainMiner").await, MINING_REWARD);
    assert_eq!(node.blocks().await.len(), 2);
    assert!(node.transactions().await.is_empty());
}

#[tokio::test]
async fn submitted_transaction_is_pooled_and_published() {
    let (node, _dir) = temp_node("http://node-a");
    let mut events = node.subscribe_events();

    let txn = Transaction::new("alice".into(), "bob".into(), 10, Vec::new());
    node.submit_transaction(txn.clone()).await.unwrap();

    let pool = node.transactions().await;
    assert_eq!(pool.len(), 1);
    assert_eq!(pool[0].transaction_hash, txn.transaction_hash);

    match events.recv().await.unwrap() {
        blockchain::events::Event::TransactionAdded(published) => {
            assert_eq!(published.transaction_hash, txn.transaction_hash);
        }
        other => panic!("expected TransactionAdded, got {other:?}"),
    }
}

#[tokio::test]
async fn overspending_sender_is_marked_verification_failure_but_still_pooled() {
    let (node, _dir) = temp_node("http://node-a");
    let (private, public, alice) = test_identity();

    let mut funding = Block::new(node.blocks().await[0].hash(), 0, 1);
    funding
        .add_transaction(Transaction::new_coinbase(alice.clone(), 1000))
        .unwrap();
    funding.mine(1);
    node.append_block(funding).await.unwrap();

    let first = signed_transaction(&private, &public, alice.clone(), "bob", 700);
    let pooled_first = node.submit_transaction(first).await.unwrap();
    assert_eq!(pooled_first.status, TransactionStatus::VerificationSuccess);

    let second = signed_transaction(&private, &public, alice, "carol", 500);
    let pooled_second = node.submit_transaction(second).await.unwrap();
    assert_eq!(pooled_second.status, TransactionStatus::VerificationFailure);
}

#[tokio::test]
async fn longer_verified_connecting_chain_is_adopted() {
    let (node, _dir) = temp_node("http://node-a");
    let genesis = node.blocks().await[0].clone();

    let mut next = Block::new(genesis.hash(), 0, 1);
    next.add_transaction(Transaction::new_coinbase("remoteMiner".into(), MINING_REWARD))
        .unwrap();
    next.mine(MINING_DIFFICULTY);
    let remote_tail = vec![genesis, next];

    assert!(node.candidate_tail_is_acceptable(&remote_tail).await);
    node.adopt_tail(remote_tail).await.unwrap();

    assert_eq!(node.blocks().await.len(), 2);
    assert_eq!(node.balance("remoteMiner").await, MINING_REWARD);
    assert!(!node.mining_locked().await);
}

#[tokio::test]
async fn tail_with_no_real_ancestor_is_rejected() {
    let (node, _dir) = temp_node("http://node-a");
    let genesis = node.blocks().await[0].clone();
    let mut real_next = Block::new(genesis.hash(), 0, 1);
    real_next
        .add_transaction(Transaction::new_coinbase("miner".into(), MINING_REWARD))
        .unwrap();
    real_next.mine(1);
    node.append_block(real_next).await.unwrap();

    let mut fork = Block::new("0xdeadbeef".into(), 0, 2);
    fork.add_transaction(Transaction::new_coinbase("intruder".into(), MINING_REWARD))
        .unwrap();
    fork.mine(MINING_DIFFICULTY);
    let bogus_tail = vec![fork];

    assert!(!node.candidate_tail_is_acceptable(&bogus_tail).await);
    assert_eq!(node.blocks().await.len(), 2);
}

#[test]
fn verify_last_n_rejects_a_tail_whose_blocks_do_not_chain() {
    let mut first = Block::new("0x0".into(), 0, 0);
    first.add_transaction(Transaction::new_coinbase("a".into(), MINING_REWARD)).unwrap();
    let mut second = Block::new("0xnotfirst".into(), 0, 1);
    second.add_transaction(Transaction::new_coinbase("b".into(), MINING_REWARD)).unwrap();
    second.mine(MINING_DIFFICULTY);
    assert!(!Chain::verify_last_n(&[first, second]));
}
