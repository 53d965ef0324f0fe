//! Solidity bindings for the marketplace contracts.
//!
//! Each function becomes a `<name>Call` struct implementing
//! [`SolCall`](alloy_sol_types::SolCall) and each event a struct
//! implementing [`SolEvent`](alloy_sol_types::SolEvent). Pass the call
//! structs to [`Eth::view`](crate::Eth::view) and
//! [`Eth::send`](crate::Eth::send) for methods the facades don't wrap.

use alloy_sol_types::sol;

sol! {
    /// The Tomosia ERC-721 collection: owner-minted, pausable, burnable.
    #[sol(all_derives)]
    interface TomosiaNFT {
        function owner() external view returns (address);
        function paused() external view returns (bool);

        function setBaseURI(string baseURI) external;
        function mintNfts(string[] tokenURIs) external;
        function mintNft(string tokenURI) external;

        function safeTransferFrom(address from, address to, uint256 tokenId) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
        function setApprovalForAll(address operator, bool approved) external;
        function approve(address to, uint256 tokenId) external;
        function burn(uint256 tokenId) external;

        function ownerTokenIds(address owner) external view returns (uint256[]);
        function balanceOf(address owner) external view returns (uint256);
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function ownerOf(uint256 tokenId) external view returns (address);
        function tokenURI(uint256 tokenId) external view returns (string);

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }

    /// A marketplace listing, as returned by the `fetch*` views.
    #[derive(Debug, PartialEq, Eq)]
    struct MarketItem {
        uint256 itemId;
        address nftContract;
        uint256 tokenId;
        address seller;
        address owner;
        uint256 price;
        bool sold;
    }

    /// Fixed-price marketplace for whitelisted NFT collections.
    #[sol(all_derives)]
    interface Marketplace {
        #[derive(Debug)]
        event MarketItemCreated(
            uint256 indexed itemId,
            address indexed nftContract,
            uint256 indexed tokenId,
            address seller,
            address owner,
            uint256 price,
            bool sold
        );

        #[derive(Debug)]
        event MarketItemSold(
            uint256 indexed itemId,
            address indexed nftContract,
            uint256 indexed tokenId,
            address seller,
            address owner,
            uint256 price
        );

        #[derive(Debug)]
        event MarketItemCancelled(
            uint256 indexed itemId,
            address indexed nftContract,
            uint256 indexed tokenId,
            address seller
        );

        function owner() external view returns (address);

        function addNFTSupportAddress(address nftContract) external;
        function isNFTAddressSupported(address nftContract) external view returns (bool);

        function createMarketItems(uint256[] tokenIds, address nftContract, uint256 price) external;
        function createMarketItem(uint256 tokenId, address nftContract, uint256 price) external;
        function changeMarketItem(uint256 tokenId, address nftContract, uint256 price) external;
        function buyMarketItem(uint256 itemId, address nftContract) external payable;
        function cancelMarketItem(uint256 itemId, address nftContract) external;

        function fetchMarketItems(address nftContract) external view returns (MarketItem[]);
        function fetchMyNFTs(address sender, address nftContract) external view returns (MarketItem[]);
        function fetchItemsCreated(address sender, address nftContract) external view returns (MarketItem[]);

        function setOldContract(address oldContract) external;
        function setNewContract(address newContract) external;
        function migrate() external;
    }
}
